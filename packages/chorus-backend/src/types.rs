use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full request: header selectors merged with the compiled body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
	pub index: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub r#type: Option<String>,
	pub body: Value,
}
impl SearchRequest {
	pub fn new(index: impl Into<String>, r#type: Option<String>, body: Value) -> Self {
		Self { index: index.into(), r#type, body }
	}

	/// Path of the `_search` endpoint relative to the cluster base URL.
	pub fn search_path(&self) -> String {
		match self.r#type.as_deref() {
			Some(kind) => format!("/{}/{kind}/_search", self.index),
			None => format!("/{}/_search", self.index),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
	pub hits: Hits,
	#[serde(default)]
	pub aggregations: Option<Value>,
}
impl SearchResponse {
	pub fn new(hits: Vec<Value>, total: u64, aggregations: Option<Value>) -> Self {
		Self { hits: Hits { hits, total: Some(HitsTotal::Count(total)) }, aggregations }
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hits {
	#[serde(default)]
	pub hits: Vec<Value>,
	/// Absent when the request disables total tracking (`track_total_hits: false`).
	#[serde(default)]
	pub total: Option<HitsTotal>,
}
impl Hits {
	/// Reported total, or the number of returned hits when the backend did not count.
	pub fn total_value(&self) -> u64 {
		match self.total.as_ref() {
			Some(total) => total.value(),
			None => self.hits.len() as u64,
		}
	}
}

/// Older clusters report a bare count; newer ones report `{ value, relation }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HitsTotal {
	Count(u64),
	Detailed { value: u64, relation: String },
}
impl HitsTotal {
	pub fn value(&self) -> u64 {
		match self {
			Self::Count(value) | Self::Detailed { value, .. } => *value,
		}
	}
}
