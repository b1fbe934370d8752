pub mod client;
pub mod types;

mod error;

pub use client::ElasticsearchClient;
pub use error::{Error, Result};
pub use types::{Hits, HitsTotal, SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can execute a full search request.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>>;
}

impl SearchBackend for ElasticsearchClient {
	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>> {
		Box::pin(ElasticsearchClient::search(self, request))
	}
}

pub fn auth_headers(
	auth: Option<&chorus_config::BackendAuth>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = auth.and_then(|auth| auth.api_key.as_deref()) {
		let mut value: HeaderValue = format!("ApiKey {api_key}").parse()?;

		value.set_sensitive(true);
		headers.insert(AUTHORIZATION, value);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
