use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use chorus_backend::{ElasticsearchClient, SearchBackend, SearchRequest, SearchResponse};
use chorus_config::Config;
use chorus_domain::{Instruction, SortDirection};

use crate::{
	Error, Result,
	compiler::{self, Paging},
	debounce::DebounceHandle,
	store::{RequestHeader, SearchStore},
};

const AGGREGATION_CHANNEL_CAPACITY: usize = 16;

/// How a single `fetch` call ended.
#[derive(Debug)]
pub enum FetchOutcome {
	/// Hits replaced the result set and the score is the backend total.
	Completed { hits: usize, total: u64 },
	/// The backend answered with no hits; result set emptied, score zeroed.
	Empty,
	/// The backend call failed; score zeroed, previous result set kept.
	Failed { error: Error },
	/// A newer fetch was issued while this one was in flight; nothing was committed.
	Superseded { generation: u64 },
}
impl FetchOutcome {
	pub fn is_committed(&self) -> bool {
		!matches!(self, Self::Superseded { .. })
	}
}

/// Assembles the contributed instructions into one request, executes it, and republishes
/// results through the shared store and the aggregation channel.
#[derive(Clone)]
pub struct SearchCoordinator {
	store: SearchStore,
	backend: Arc<dyn SearchBackend>,
	settings: chorus_config::Search,
	aggregations: broadcast::Sender<Arc<Value>>,
}
impl SearchCoordinator {
	pub fn new(
		store: SearchStore,
		backend: Arc<dyn SearchBackend>,
		settings: chorus_config::Search,
	) -> Self {
		let (aggregations, _) = broadcast::channel(AGGREGATION_CHANNEL_CAPACITY);

		Self { store, backend, settings, aggregations }
	}

	pub fn from_config(cfg: &Config) -> Result<Self> {
		let client = ElasticsearchClient::new(&cfg.backend)?;
		let store = SearchStore::new(RequestHeader {
			index: cfg.backend.index.clone(),
			r#type: cfg.backend.r#type.clone(),
		});

		Ok(Self::new(store, Arc::new(client), cfg.search.clone()))
	}

	pub fn store(&self) -> &SearchStore {
		&self.store
	}

	pub fn settings(&self) -> &chorus_config::Search {
		&self.settings
	}

	/// Each successful fetch that carries aggregations sends exactly one message.
	pub fn subscribe_aggregations(&self) -> broadcast::Receiver<Arc<Value>> {
		self.aggregations.subscribe()
	}

	pub fn request(&self) -> SearchRequest {
		self.store.request()
	}

	/// Compiles the current instructions with default paging and stores the body.
	pub fn mount(&self) -> Result<Value> {
		let instructions = self.store.instructions();
		let body = compiler::compile(&instructions, Some(Paging::from_settings(&self.settings)))
			.inspect_err(|err| {
				tracing::warn!(error = %err, "Failed to compile search instructions.");
			})?;

		tracing::debug!(instructions = instructions.len(), "Mounted search body.");

		self.store.set_body(body.clone());

		Ok(body)
	}

	/// Compiles an arbitrary instruction list without paging and without touching the store.
	pub fn mount_instructions(&self, instructions: &[Instruction]) -> Result<Value> {
		compiler::compile(instructions, None)
	}

	pub fn add_debounce(&self, handle: DebounceHandle) -> Uuid {
		self.store.add_debounce(handle)
	}

	pub fn reset_debounce(&self) -> usize {
		self.store.reset_debounce()
	}

	/// Executes the current full request and commits the response if it is still the latest.
	///
	/// Backend failures never surface as an error here; they zero the score and are reported
	/// through [`FetchOutcome::Failed`].
	pub async fn fetch(&self) -> FetchOutcome {
		let cancelled = self.store.reset_debounce();
		let generation = self.store.next_generation();
		let request = self.store.request();

		tracing::debug!(
			generation,
			cancelled_debounces = cancelled,
			index = %request.index,
			"Fetching search results."
		);

		let result = self.backend.search(&request).await;

		match result {
			Ok(response) => self.commit_response(generation, response),
			Err(err) => {
				if !self.store.commit_failure(generation) {
					return superseded(generation);
				}

				tracing::warn!(generation, error = %err, "Search request failed.");

				FetchOutcome::Failed { error: err.into() }
			},
		}
	}

	/// Mounts then fetches; compile errors propagate, backend errors do not.
	pub async fn mount_and_fetch(&self) -> Result<FetchOutcome> {
		self.mount()?;

		Ok(self.fetch().await)
	}

	pub fn spawn_fetch(&self) -> JoinHandle<FetchOutcome> {
		let coordinator = self.clone();

		tokio::spawn(async move { coordinator.fetch().await })
	}

	/// Schedules a fetch after `delay` and registers it as a pending debounce.
	///
	/// Any fetch that starts before the delay elapses cancels it.
	pub fn schedule_fetch(&self, delay: Duration) -> Uuid {
		let id = Uuid::new_v4();
		let coordinator = self.clone();
		let task = tokio::spawn(async move {
			tokio::time::sleep(delay).await;

			// Leave the pending set first so this fetch's own reset does not abort it.
			coordinator.store.withdraw_debounce(id);

			coordinator.fetch().await
		});

		self.store.add_debounce(DebounceHandle::with_id(id, task.abort_handle()))
	}

	pub fn schedule_debounced_fetch(&self) -> Uuid {
		self.schedule_fetch(Duration::from_millis(self.settings.debounce_ms))
	}

	/// Derives a standalone request carrying one ordered terms aggregation.
	///
	/// The stored body is left untouched; the caller decides when to send the request.
	pub fn create_request_for_aggs(
		&self,
		field: &str,
		size: u64,
		order_key: &str,
		order_direction: SortDirection,
	) -> Result<SearchRequest> {
		let mut request = self.store.request();

		request.body = compiler::terms_aggregation_body(
			field,
			size,
			order_key,
			order_direction,
			self.settings.aggregation_page_size,
		)?;

		Ok(request)
	}

	/// Builds the standalone request for a widget's registered aggregation settings.
	pub fn create_request_for_settings(&self, name: &str) -> Result<Option<SearchRequest>> {
		let Some(settings) = self.store.aggregation(name) else {
			return Ok(None);
		};

		self.create_request_for_aggs(
			&settings.field,
			settings.size,
			&settings.order_key,
			settings.order_direction,
		)
		.map(Some)
	}

	/// Sends a standalone aggregation request and returns its aggregations payload.
	///
	/// Neither the result set nor the score is touched.
	pub async fn fetch_aggregation_buckets(
		&self,
		field: &str,
		size: u64,
		order_key: &str,
		order_direction: SortDirection,
	) -> Result<Option<Value>> {
		let request = self.create_request_for_aggs(field, size, order_key, order_direction)?;
		let response = self.backend.search(&request).await?;

		Ok(response.aggregations)
	}

	fn commit_response(&self, generation: u64, response: SearchResponse) -> FetchOutcome {
		let SearchResponse { hits, aggregations } = response;
		let count = hits.hits.len();
		// An empty page past the end still reports a total; the score follows the result set.
		let total = if count == 0 { 0 } else { hits.total_value() };

		if !self.store.commit_hits(generation, hits.hits, total) {
			return superseded(generation);
		}

		if let Some(aggregations) = aggregations {
			let listeners = self.aggregations.send(Arc::new(aggregations)).unwrap_or(0);

			tracing::debug!(listeners, "Broadcast aggregations.");
		}

		if count == 0 { FetchOutcome::Empty } else { FetchOutcome::Completed { hits: count, total } }
	}
}

fn superseded(generation: u64) -> FetchOutcome {
	tracing::debug!(generation, "Discarding superseded search response.");

	FetchOutcome::Superseded { generation }
}
