use serde_json::{Map, Value};

use chorus_domain::{BodyBuilder, Instruction, RawInstruction, SortDirection};

use crate::Result;

/// Paging applied before any instruction is replayed; `from`/`size` instructions override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
	pub from: u64,
	pub size: u64,
}
impl Paging {
	pub fn from_settings(settings: &chorus_config::Search) -> Self {
		Self { from: settings.page_from, size: settings.page_size }
	}
}
impl Default for Paging {
	fn default() -> Self {
		Self { from: chorus_config::DEFAULT_PAGE_FROM, size: chorus_config::DEFAULT_PAGE_SIZE }
	}
}

/// Replays `instructions` in order against a fresh builder.
///
/// Fails on the first instruction the builder rejects; no partial body is returned.
pub fn compile(instructions: &[Instruction], paging: Option<Paging>) -> Result<Value> {
	let mut builder = match paging {
		Some(paging) => BodyBuilder::new().from(paging.from).size(paging.size),
		None => BodyBuilder::new(),
	};

	for instruction in instructions {
		builder.apply(instruction)?;
	}

	Ok(builder.build())
}

pub fn compile_raw(instructions: &[RawInstruction], paging: Option<Paging>) -> Result<Value> {
	let typed = instructions
		.iter()
		.cloned()
		.map(Instruction::try_from)
		.collect::<Result<Vec<_>, _>>()?;

	compile(&typed, paging)
}

/// Body holding a single ordered terms aggregation.
///
/// `page_size` is the hit page size of the request; `size` is the bucket count.
pub fn terms_aggregation_body(
	field: &str,
	size: u64,
	order_key: &str,
	order_direction: SortDirection,
	page_size: u64,
) -> Result<Value> {
	let mut options = Map::new();

	options.insert(
		"order".to_string(),
		serde_json::json!({ order_key: order_direction.as_str() }),
	);
	options.insert("size".to_string(), Value::from(size));

	let builder = BodyBuilder::new().size(page_size).aggregation("terms", field, &options, None)?;

	Ok(builder.build())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::Error;

	#[test]
	fn main_request_gets_default_paging() {
		let body = compile(&[], Some(Paging::default())).expect("compile failed");

		assert_eq!(body, json!({ "from": 0, "size": 10 }));
	}

	#[test]
	fn size_instruction_overrides_default_paging() {
		let body = compile(&[Instruction::Size(50)], Some(Paging::default())).expect("compile failed");

		assert_eq!(body["size"], 50);
	}

	#[test]
	fn unsupported_raw_operation_fails_the_whole_compile() {
		let raw = vec![
			RawInstruction::new("query", vec![json!("match"), json!("title"), json!("foo")]),
			RawInstruction::new("highlight", vec![json!("title")]),
		];
		let err = compile_raw(&raw, None).expect_err("expected unsupported operation");

		assert!(matches!(err, Error::UnsupportedOperation { ref op } if op == "highlight"));
	}

	#[test]
	fn terms_aggregation_body_keeps_page_size_and_bucket_count_apart() {
		let body =
			terms_aggregation_body("category", 5, "_count", SortDirection::Desc, 200).expect("build failed");

		assert_eq!(
			body,
			json!({
				"size": 200,
				"aggs": {
					"agg_terms_category": {
						"terms": { "field": "category", "order": { "_count": "desc" }, "size": 5 }
					}
				}
			})
		);
	}
}
