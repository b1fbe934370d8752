use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_PAGE_FROM: u64 = 0;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const DEFAULT_AGGREGATION_PAGE_SIZE: u64 = 200;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	/// Base URL of the search cluster, e.g. "http://localhost:9200".
	pub url: String,
	pub index: String,
	/// Optional. Mapping type for clusters that still route by type.
	#[serde(default)]
	pub r#type: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub auth: Option<BackendAuth>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendAuth {
	pub username: Option<String>,
	pub password: Option<String>,
	/// Optional. Sent as `Authorization: ApiKey <api_key>`; exclusive with username/password.
	pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_page_from")]
	pub page_from: u64,
	#[serde(default = "default_page_size")]
	pub page_size: u64,
	/// Page size of standalone aggregation requests; unrelated to the bucket count.
	#[serde(default = "default_aggregation_page_size")]
	pub aggregation_page_size: u64,
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			page_from: DEFAULT_PAGE_FROM,
			page_size: DEFAULT_PAGE_SIZE,
			aggregation_page_size: DEFAULT_AGGREGATION_PAGE_SIZE,
			debounce_ms: DEFAULT_DEBOUNCE_MS,
		}
	}
}

fn default_page_from() -> u64 {
	DEFAULT_PAGE_FROM
}

fn default_page_size() -> u64 {
	DEFAULT_PAGE_SIZE
}

fn default_aggregation_page_size() -> u64 {
	DEFAULT_AGGREGATION_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE_MS
}
