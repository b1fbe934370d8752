use serde_json::{Map, Value};

use crate::{Clause, Error, Instruction, Result, SortDirection};

// Top-level keys owned by dedicated operations; `raw_option` may not overwrite them.
const RESERVED_KEYS: [&str; 5] = ["query", "sort", "aggs", "from", "size"];

/// Stateful request-body builder.
///
/// Clauses keep their contribution order inside each `bool` section, and maps are emitted
/// with sorted keys, so replaying the same instructions always yields the same document.
#[derive(Debug, Clone, Default)]
pub struct BodyBuilder {
	must: Vec<Value>,
	filter: Vec<Value>,
	should: Vec<Value>,
	must_not: Vec<Value>,
	sort: Vec<Value>,
	aggs: Map<String, Value>,
	from: Option<u64>,
	size: Option<u64>,
	raw: Map<String, Value>,
}
impl BodyBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from(mut self, offset: u64) -> Self {
		self.from = Some(offset);

		self
	}

	pub fn size(mut self, size: u64) -> Self {
		self.size = Some(size);

		self
	}

	pub fn query(mut self, clause: &Clause) -> Self {
		self.must.push(clause.to_value());

		self
	}

	pub fn filter(mut self, clause: &Clause) -> Self {
		self.filter.push(clause.to_value());

		self
	}

	pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
		self.push_sort(field, direction);

		self
	}

	pub fn aggregation(
		mut self,
		kind: &str,
		field: &str,
		options: &Map<String, Value>,
		name: Option<&str>,
	) -> Result<Self> {
		self.push_aggregation(kind, field, options, name)?;

		Ok(self)
	}

	/// Replays one instruction against the builder state.
	pub fn apply(&mut self, instruction: &Instruction) -> Result<&mut Self> {
		match instruction {
			Instruction::Query(clause) => self.must.push(clause.to_value()),
			Instruction::Filter(clause) => self.filter.push(clause.to_value()),
			Instruction::OrFilter(clause) => self.should.push(clause.to_value()),
			Instruction::NotFilter(clause) => self.must_not.push(clause.to_value()),
			Instruction::Sort { field, direction } => self.push_sort(field, *direction),
			Instruction::Aggregation { kind, field, options, name } =>
				self.push_aggregation(kind, field, options, name.as_deref())?,
			Instruction::From(offset) => self.from = Some(*offset),
			Instruction::Size(size) => self.size = Some(*size),
			Instruction::RawOption { key, value } => {
				if RESERVED_KEYS.contains(&key.as_str()) {
					return Err(Error::InvalidArguments {
						op: instruction.op_name().to_string(),
						message: format!("'{key}' is managed by a dedicated operation."),
					});
				}

				self.raw.insert(key.clone(), value.clone());
			},
		}

		Ok(self)
	}

	pub fn build(&self) -> Value {
		let mut body = self.raw.clone();

		if let Some(query) = self.query_value() {
			body.insert("query".to_string(), query);
		}
		if !self.sort.is_empty() {
			body.insert("sort".to_string(), Value::Array(self.sort.clone()));
		}
		if !self.aggs.is_empty() {
			body.insert("aggs".to_string(), Value::Object(self.aggs.clone()));
		}
		if let Some(from) = self.from {
			body.insert("from".to_string(), Value::from(from));
		}
		if let Some(size) = self.size {
			body.insert("size".to_string(), Value::from(size));
		}

		Value::Object(body)
	}

	fn push_sort(&mut self, field: &str, direction: SortDirection) {
		self.sort.push(serde_json::json!({ field: { "order": direction.as_str() } }));
	}

	fn push_aggregation(
		&mut self,
		kind: &str,
		field: &str,
		options: &Map<String, Value>,
		name: Option<&str>,
	) -> Result<()> {
		if options.contains_key("field") {
			return Err(Error::InvalidArguments {
				op: "aggregation".to_string(),
				message: "options must not override the aggregation field.".to_string(),
			});
		}

		let mut spec = Map::new();

		spec.insert("field".to_string(), Value::String(field.to_string()));
		spec.extend(options.iter().map(|(key, value)| (key.clone(), value.clone())));

		let name = name.map(str::to_string).unwrap_or_else(|| format!("agg_{kind}_{field}"));

		self.aggs.insert(name, serde_json::json!({ kind: spec }));

		Ok(())
	}

	fn query_value(&self) -> Option<Value> {
		let only_scoring =
			self.filter.is_empty() && self.should.is_empty() && self.must_not.is_empty();

		if only_scoring {
			match self.must.as_slice() {
				[] => return None,
				[single] => return Some(single.clone()),
				_ => {},
			}
		}

		let mut bool_query = Map::new();

		for (key, clauses) in [
			("must", &self.must),
			("filter", &self.filter),
			("should", &self.should),
			("must_not", &self.must_not),
		] {
			if !clauses.is_empty() {
				bool_query.insert(key.to_string(), Value::Array(clauses.clone()));
			}
		}

		if !self.should.is_empty() {
			bool_query.insert("minimum_should_match".to_string(), Value::from(1));
		}

		Some(serde_json::json!({ "bool": bool_query }))
	}
}
