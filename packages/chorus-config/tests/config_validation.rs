use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use chorus_config::{Config, DEFAULT_AGGREGATION_PAGE_SIZE, DEFAULT_PAGE_SIZE, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn table_mut<'a>(value: &'a mut Value, name: &str) -> &'a mut toml::Table {
	value
		.as_table_mut()
		.expect("Template config must be a table.")
		.get_mut(name)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{name}]."))
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("chorus_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_value(value: &Value) -> chorus_config::Result<Config> {
	let payload = toml::to_string(value).expect("Failed to render template config.");
	let path = write_temp_config(payload);
	let result = chorus_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation(value: &Value, expected: &str) {
	let err = load_value(value).expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");

	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_value(&sample_value()).expect("Sample config should load.");

	assert_eq!(cfg.backend.url, "http://localhost:9200");
	assert_eq!(cfg.backend.r#type, None);

	let auth = cfg.backend.auth.expect("Auth should survive normalization.");

	assert_eq!(auth.username.as_deref(), Some("elastic"));
	assert_eq!(auth.api_key, None);
}

#[test]
fn search_section_defaults_when_absent() {
	let mut value = sample_value();

	value.as_table_mut().expect("table").remove("search");

	let cfg = load_value(&value).expect("Config without [search] should load.");

	assert_eq!(cfg.search.page_from, 0);
	assert_eq!(cfg.search.page_size, DEFAULT_PAGE_SIZE);
	assert_eq!(cfg.search.aggregation_page_size, DEFAULT_AGGREGATION_PAGE_SIZE);
}

#[test]
fn blank_auth_collapses_to_none() {
	let mut value = sample_value();
	let auth = table_mut(&mut value, "backend")
		.get_mut("auth")
		.and_then(Value::as_table_mut)
		.expect("Template config must include [backend.auth].");

	auth.insert("username".to_string(), Value::String(" ".to_string()));
	auth.insert("password".to_string(), Value::String(String::new()));

	let cfg = load_value(&value).expect("Blank auth should load.");

	assert!(cfg.backend.auth.is_none());
}

#[test]
fn backend_url_must_be_http() {
	let mut value = sample_value();

	table_mut(&mut value, "backend")
		.insert("url".to_string(), Value::String("localhost:9200".to_string()));

	expect_validation(&value, "backend.url must start with http:// or https://.");
}

#[test]
fn backend_index_must_be_non_empty() {
	let mut value = sample_value();

	table_mut(&mut value, "backend").insert("index".to_string(), Value::String("  ".to_string()));

	expect_validation(&value, "backend.index must be non-empty.");
}

#[test]
fn validation_error_names_offending_key() {
	let mut value = sample_value();

	table_mut(&mut value, "search").insert("aggregation_page_size".to_string(), Value::Integer(0));

	let err = load_value(&value).expect_err("Expected validation error.");

	match err {
		Error::Validation { key, message } => {
			assert_eq!(key, "search.aggregation_page_size");
			assert_eq!(message, "must be greater than zero.");
		},
		other => panic!("Unexpected error kind: {other:?}"),
	}
}

#[test]
fn timeout_must_be_positive() {
	let mut value = sample_value();

	table_mut(&mut value, "backend").insert("timeout_ms".to_string(), Value::Integer(0));

	expect_validation(&value, "backend.timeout_ms must be greater than zero.");
}

#[test]
fn auth_modes_are_exclusive() {
	let mut value = sample_value();
	let auth = table_mut(&mut value, "backend")
		.get_mut("auth")
		.and_then(Value::as_table_mut)
		.expect("Template config must include [backend.auth].");

	auth.insert("api_key".to_string(), Value::String("secret".to_string()));

	expect_validation(&value, "either username/password or api_key");
}

#[test]
fn default_header_values_must_be_strings() {
	let mut value = sample_value();
	let headers = table_mut(&mut value, "backend")
		.get_mut("default_headers")
		.and_then(Value::as_table_mut)
		.expect("Template config must include [backend.default_headers].");

	headers.insert("x-retries".to_string(), Value::Integer(3));

	expect_validation(&value, "backend.default_headers.x-retries must be a string.");
}

#[test]
fn page_size_must_be_positive() {
	let mut value = sample_value();

	table_mut(&mut value, "search").insert("page_size".to_string(), Value::Integer(0));

	expect_validation(&value, "search.page_size must be greater than zero.");
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("chorus_config_missing_file.toml");
	let err = chorus_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
	assert!(err.to_string().contains("chorus_config_missing_file.toml"));
}
