use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::{Error, Result, SearchRequest, SearchResponse};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for an Elasticsearch-compatible `_search` endpoint.
#[derive(Clone, Debug)]
pub struct ElasticsearchClient {
	base_url: String,
	client: Client,
	basic_auth: Option<(String, Option<String>)>,
}
impl ElasticsearchClient {
	pub fn new(cfg: &chorus_config::Backend) -> Result<Self> {
		let headers = crate::auth_headers(cfg.auth.as_ref(), &cfg.default_headers)?;
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(headers)
			.build()?;
		let basic_auth = cfg
			.auth
			.as_ref()
			.and_then(|auth| auth.username.clone().map(|username| (username, auth.password.clone())));

		Ok(Self { base_url: cfg.url.trim_end_matches('/').to_string(), client, basic_auth })
	}

	pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
		let url = format!("{}{}", self.base_url, request.search_path());

		tracing::debug!(%url, "Sending search request.");

		let res = self.authorize(self.client.post(url)).json(&request.body).send().await?;
		let status = res.status();

		if !status.is_success() {
			let text = res.text().await.unwrap_or_default();

			return Err(Error::Status {
				status: status.as_u16(),
				message: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
			});
		}

		let json: Value = res.json().await?;

		parse_search_response(json)
	}

	fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
		match self.basic_auth.as_ref() {
			Some((username, password)) => builder.basic_auth(username, password.as_ref()),
			None => builder,
		}
	}
}

pub fn parse_search_response(json: Value) -> Result<SearchResponse> {
	if json.get("hits").and_then(Value::as_object).is_none() {
		return Err(Error::InvalidResponse {
			message: "Search response is missing hits object.".to_string(),
		});
	}

	Ok(serde_json::from_value(json)?)
}
