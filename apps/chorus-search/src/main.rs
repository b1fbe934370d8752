use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = chorus_search::Args::parse();

	chorus_search::run(args).await
}
