use std::{
	fmt::{Display, Formatter},
	vec::IntoIter,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

const OP_QUERY: &str = "query";
const OP_FILTER: &str = "filter";
const OP_OR_FILTER: &str = "or_filter";
const OP_NOT_FILTER: &str = "not_filter";
const OP_SORT: &str = "sort";
const OP_AGGREGATION: &str = "aggregation";
const OP_FROM: &str = "from";
const OP_SIZE: &str = "size";
const OP_RAW_OPTION: &str = "raw_option";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}
impl SortDirection {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.to_ascii_lowercase().as_str() {
			"asc" => Some(Self::Asc),
			"desc" => Some(Self::Desc),
			_ => None,
		}
	}
}

impl Display for SortDirection {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A leaf clause rendered as `{ <kind>: { <field>: <value> } }`.
///
/// The clause kind is passed through untouched, so any leaf query the backend understands
/// (`match`, `term`, `terms`, `range`, `exists`, ...) can be contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
	pub kind: String,
	pub field: String,
	pub value: Value,
}
impl Clause {
	pub fn new(kind: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
		Self { kind: kind.into(), field: field.into(), value: value.into() }
	}

	pub fn to_value(&self) -> Value {
		let mut inner = Map::new();

		inner.insert(self.field.clone(), self.value.clone());

		let mut outer = Map::new();

		outer.insert(self.kind.clone(), Value::Object(inner));

		Value::Object(outer)
	}

	fn into_args(self) -> Vec<Value> {
		vec![Value::String(self.kind), Value::String(self.field), self.value]
	}
}

/// One query fragment contributed by a widget, replayed in order against a
/// [`BodyBuilder`](crate::BodyBuilder).
///
/// The wire form is `{ "op": <name>, "args": [<positional values>] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInstruction", into = "RawInstruction")]
pub enum Instruction {
	Query(Clause),
	Filter(Clause),
	OrFilter(Clause),
	NotFilter(Clause),
	Sort { field: String, direction: SortDirection },
	Aggregation { kind: String, field: String, options: Map<String, Value>, name: Option<String> },
	From(u64),
	Size(u64),
	RawOption { key: String, value: Value },
}
impl Instruction {
	pub fn query(kind: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::Query(Clause::new(kind, field, value))
	}

	pub fn filter(
		kind: impl Into<String>,
		field: impl Into<String>,
		value: impl Into<Value>,
	) -> Self {
		Self::Filter(Clause::new(kind, field, value))
	}

	pub fn or_filter(
		kind: impl Into<String>,
		field: impl Into<String>,
		value: impl Into<Value>,
	) -> Self {
		Self::OrFilter(Clause::new(kind, field, value))
	}

	pub fn not_filter(
		kind: impl Into<String>,
		field: impl Into<String>,
		value: impl Into<Value>,
	) -> Self {
		Self::NotFilter(Clause::new(kind, field, value))
	}

	pub fn sort(field: impl Into<String>, direction: SortDirection) -> Self {
		Self::Sort { field: field.into(), direction }
	}

	pub fn aggregation(kind: impl Into<String>, field: impl Into<String>) -> Self {
		Self::Aggregation { kind: kind.into(), field: field.into(), options: Map::new(), name: None }
	}

	/// Builds an instruction from an operation name and positional arguments.
	pub fn from_parts(op: &str, args: Vec<Value>) -> Result<Self> {
		let mut args = Args::new(op, args);
		let instruction = match op {
			OP_QUERY => Self::Query(args.clause()?),
			OP_FILTER => Self::Filter(args.clause()?),
			OP_OR_FILTER => Self::OrFilter(args.clause()?),
			OP_NOT_FILTER => Self::NotFilter(args.clause()?),
			OP_SORT => {
				let field = args.string("field")?;
				let direction = match args.optional() {
					Some(Value::String(raw)) => SortDirection::parse(&raw).ok_or_else(|| {
						args.invalid(format!("direction must be asc or desc, got '{raw}'."))
					})?,
					Some(other) => {
						return Err(args.invalid(format!("direction must be a string, got {other}.")));
					},
					None => SortDirection::default(),
				};

				Self::Sort { field, direction }
			},
			OP_AGGREGATION => {
				let kind = args.string("kind")?;
				let field = args.string("field")?;
				let options = match args.optional() {
					Some(Value::Object(options)) => options,
					Some(other) => {
						return Err(args.invalid(format!("options must be an object, got {other}.")));
					},
					None => Map::new(),
				};
				let name = match args.optional() {
					Some(Value::String(name)) => Some(name),
					Some(other) => {
						return Err(args.invalid(format!("name must be a string, got {other}.")));
					},
					None => None,
				};

				Self::Aggregation { kind, field, options, name }
			},
			OP_FROM => Self::From(args.unsigned("offset")?),
			OP_SIZE => Self::Size(args.unsigned("size")?),
			OP_RAW_OPTION => {
				let key = args.string("key")?;
				let value = args.required("value")?;

				Self::RawOption { key, value }
			},
			_ => return Err(Error::UnsupportedOperation { op: op.to_string() }),
		};

		args.finish()?;

		Ok(instruction)
	}

	pub fn op_name(&self) -> &'static str {
		match self {
			Self::Query(_) => OP_QUERY,
			Self::Filter(_) => OP_FILTER,
			Self::OrFilter(_) => OP_OR_FILTER,
			Self::NotFilter(_) => OP_NOT_FILTER,
			Self::Sort { .. } => OP_SORT,
			Self::Aggregation { .. } => OP_AGGREGATION,
			Self::From(_) => OP_FROM,
			Self::Size(_) => OP_SIZE,
			Self::RawOption { .. } => OP_RAW_OPTION,
		}
	}

	pub fn into_args(self) -> Vec<Value> {
		match self {
			Self::Query(clause)
			| Self::Filter(clause)
			| Self::OrFilter(clause)
			| Self::NotFilter(clause) => clause.into_args(),
			Self::Sort { field, direction } =>
				vec![Value::String(field), Value::String(direction.as_str().to_string())],
			Self::Aggregation { kind, field, options, name } => {
				let mut args = vec![Value::String(kind), Value::String(field)];

				if !options.is_empty() || name.is_some() {
					args.push(Value::Object(options));
				}
				if let Some(name) = name {
					args.push(Value::String(name));
				}

				args
			},
			Self::From(offset) => vec![Value::from(offset)],
			Self::Size(size) => vec![Value::from(size)],
			Self::RawOption { key, value } => vec![Value::String(key), value],
		}
	}
}

impl Display for Instruction {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let raw = RawInstruction::from(self.clone());

		write!(f, "{}{}", raw.op, Value::Array(raw.args))
	}
}

/// Untyped `(operation, arguments)` pair as it travels between widgets and files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstruction {
	pub op: String,
	#[serde(default)]
	pub args: Vec<Value>,
}
impl RawInstruction {
	pub fn new(op: impl Into<String>, args: Vec<Value>) -> Self {
		Self { op: op.into(), args }
	}
}

impl TryFrom<RawInstruction> for Instruction {
	type Error = Error;

	fn try_from(raw: RawInstruction) -> Result<Self> {
		Self::from_parts(&raw.op, raw.args)
	}
}

impl From<Instruction> for RawInstruction {
	fn from(instruction: Instruction) -> Self {
		let op = instruction.op_name().to_string();

		Self { op, args: instruction.into_args() }
	}
}

struct Args {
	op: String,
	values: IntoIter<Value>,
	position: usize,
}
impl Args {
	fn new(op: &str, values: Vec<Value>) -> Self {
		Self { op: op.to_string(), values: values.into_iter(), position: 0 }
	}

	fn invalid(&self, message: String) -> Error {
		Error::InvalidArguments { op: self.op.clone(), message }
	}

	fn required(&mut self, label: &str) -> Result<Value> {
		self.position += 1;

		self.values
			.next()
			.ok_or_else(|| self.invalid(format!("missing argument {} ({label}).", self.position)))
	}

	// Trailing optional arguments may be omitted or passed as null.
	fn optional(&mut self) -> Option<Value> {
		self.position += 1;

		self.values.next().filter(|value| !value.is_null())
	}

	fn string(&mut self, label: &str) -> Result<String> {
		match self.required(label)? {
			Value::String(value) if !value.trim().is_empty() => Ok(value),
			Value::String(_) => Err(self.invalid(format!("{label} must be non-empty."))),
			other => Err(self.invalid(format!("{label} must be a string, got {other}."))),
		}
	}

	fn unsigned(&mut self, label: &str) -> Result<u64> {
		let value = self.required(label)?;

		value
			.as_u64()
			.ok_or_else(|| self.invalid(format!("{label} must be a non-negative integer, got {value}.")))
	}

	fn clause(&mut self) -> Result<Clause> {
		let kind = self.string("kind")?;
		let field = self.string("field")?;
		let value = self.required("value")?;

		Ok(Clause { kind, field, value })
	}

	fn finish(self) -> Result<()> {
		let extra = self.values.len();

		if extra > 0 {
			return Err(self.invalid(format!("{extra} unexpected trailing argument(s).")));
		}

		Ok(())
	}
}
