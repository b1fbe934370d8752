use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use chorus_service::{FetchOutcome, Instruction, SearchCoordinator, SortDirection};

#[derive(Debug, Parser)]
#[command(
	version = chorus_cli::VERSION,
	rename_all = "kebab",
	styles = chorus_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of `{"op": ..., "args": [...]}` instructions, applied in file order.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub instructions: PathBuf,
	/// Also request the buckets of a terms aggregation on this field.
	#[arg(long, value_name = "FIELD")]
	pub terms_field: Option<String>,
	#[arg(long, value_name = "COUNT", default_value_t = 10)]
	pub terms_size: u64,
	#[arg(long, value_name = "KEY", default_value = "_count")]
	pub order_key: String,
	#[arg(long, value_name = "DIRECTION", default_value = "desc", value_parser = parse_direction)]
	pub order_direction: SortDirection,
}
impl Args {
	pub fn terms(&self) -> Option<TermsRequest> {
		self.terms_field.as_ref().map(|field| TermsRequest {
			field: field.clone(),
			size: self.terms_size,
			order_key: self.order_key.clone(),
			order_direction: self.order_direction,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsRequest {
	pub field: String,
	pub size: u64,
	pub order_key: String,
	pub order_direction: SortDirection,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = chorus_config::load(&args.config)?;

	init_tracing(&config)?;

	let instructions = read_instructions(&args.instructions)?;
	let coordinator = SearchCoordinator::from_config(&config)?;

	tracing::info!(
		index = %config.backend.index,
		instructions = instructions.len(),
		"Running search."
	);

	let report = search(&coordinator, instructions, args.terms().as_ref()).await?;

	println!("{}", serde_json::to_string_pretty(&report)?);

	Ok(())
}

pub fn read_instructions(path: &Path) -> color_eyre::Result<Vec<Instruction>> {
	let raw = fs::read_to_string(path)
		.map_err(|err| eyre::eyre!("Failed to read instructions at {}: {err}", path.display()))?;
	let instructions = serde_json::from_str(&raw)
		.map_err(|err| eyre::eyre!("Invalid instructions in {}: {err}", path.display()))?;

	Ok(instructions)
}

/// Contributes `instructions`, fetches once, and reports the shared result state.
///
/// The report carries `score` and `items`, plus `buckets` when `terms` is given.
pub async fn search(
	coordinator: &SearchCoordinator,
	instructions: Vec<Instruction>,
	terms: Option<&TermsRequest>,
) -> color_eyre::Result<Value> {
	for instruction in instructions {
		coordinator.store().add_instruction(instruction);
	}

	match coordinator.mount_and_fetch().await? {
		FetchOutcome::Failed { error } => return Err(error.into()),
		outcome => tracing::debug!(?outcome, "Search finished."),
	}

	let store = coordinator.store();
	let mut report = serde_json::json!({ "score": store.score(), "items": store.items() });

	if let Some(terms) = terms {
		let buckets = coordinator
			.fetch_aggregation_buckets(
				&terms.field,
				terms.size,
				&terms.order_key,
				terms.order_direction,
			)
			.await?;

		report["buckets"] = buckets.unwrap_or(Value::Null);
	}

	Ok(report)
}

fn parse_direction(raw: &str) -> Result<SortDirection, String> {
	SortDirection::parse(raw).ok_or_else(|| format!("expected 'asc' or 'desc', got '{raw}'"))
}

fn init_tracing(config: &chorus_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

	Ok(())
}
