mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Backend, BackendAuth, Config, DEFAULT_AGGREGATION_PAGE_SIZE, DEFAULT_DEBOUNCE_MS,
	DEFAULT_PAGE_FROM, DEFAULT_PAGE_SIZE, Search, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::invalid("service.log_level", "must be non-empty."));
	}

	let url = cfg.backend.url.trim();

	if url.is_empty() {
		return Err(Error::invalid("backend.url", "must be non-empty."));
	}
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(Error::invalid("backend.url", "must start with http:// or https://."));
	}
	if cfg.backend.index.trim().is_empty() {
		return Err(Error::invalid("backend.index", "must be non-empty."));
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::invalid("backend.timeout_ms", "must be greater than zero."));
	}

	for (key, value) in &cfg.backend.default_headers {
		if !value.is_string() {
			return Err(Error::invalid(
				format!("backend.default_headers.{key}"),
				"must be a string.",
			));
		}
	}

	if let Some(auth) = cfg.backend.auth.as_ref() {
		let has_basic = auth.username.is_some() || auth.password.is_some();

		if has_basic && auth.api_key.is_some() {
			return Err(Error::invalid(
				"backend.auth",
				"must use either username/password or api_key, not both.",
			));
		}
		if has_basic && auth.username.is_none() {
			return Err(Error::invalid(
				"backend.auth.username",
				"is required when a password is set.",
			));
		}
	}

	if cfg.search.page_size == 0 {
		return Err(Error::invalid("search.page_size", "must be greater than zero."));
	}
	if cfg.search.aggregation_page_size == 0 {
		return Err(Error::invalid("search.aggregation_page_size", "must be greater than zero."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.backend.url = cfg.backend.url.trim().trim_end_matches('/').to_string();

	if cfg.backend.r#type.as_deref().map(|kind| kind.trim().is_empty()).unwrap_or(false) {
		cfg.backend.r#type = None;
	}

	if let Some(auth) = cfg.backend.auth.as_mut() {
		for slot in [&mut auth.username, &mut auth.password, &mut auth.api_key] {
			if slot.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
				*slot = None;
			}
		}
	}
	if cfg
		.backend
		.auth
		.as_ref()
		.map(|auth| auth.username.is_none() && auth.password.is_none() && auth.api_key.is_none())
		.unwrap_or(false)
	{
		cfg.backend.auth = None;
	}
}
