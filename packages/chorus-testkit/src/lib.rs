mod error;

pub use error::{Error, Result};

use std::{collections::VecDeque, sync::Mutex, time::Duration};

use serde_json::Value;
use tokio::sync::{oneshot, watch};

use chorus_backend::{BoxFuture, SearchBackend, SearchRequest, SearchResponse};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

struct Reply {
	result: chorus_backend::Result<SearchResponse>,
	release: Option<oneshot::Receiver<()>>,
}

/// Scripted backend: replies are consumed in call order, optionally held back until released.
pub struct MockBackend {
	replies: Mutex<VecDeque<Reply>>,
	requests: Mutex<Vec<SearchRequest>>,
	calls: watch::Sender<usize>,
}
impl MockBackend {
	pub fn new() -> Self {
		let (calls, _) = watch::channel(0);

		Self { replies: Mutex::new(VecDeque::new()), requests: Mutex::new(Vec::new()), calls }
	}

	pub fn respond(&self, response: SearchResponse) -> &Self {
		self.push(Ok(response), None);

		self
	}

	pub fn fail(&self, message: &str) -> &Self {
		self.push(Err(unavailable(message)), None);

		self
	}

	/// Queues a response that is only delivered once the returned sender fires (or drops).
	pub fn respond_gated(&self, response: SearchResponse) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();

		self.push(Ok(response), Some(rx));

		tx
	}

	pub fn fail_gated(&self, message: &str) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();

		self.push(Err(unavailable(message)), Some(rx));

		tx
	}

	pub fn requests(&self) -> Vec<SearchRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn call_count(&self) -> usize {
		*self.calls.borrow()
	}

	pub async fn wait_for_calls(&self, count: usize) -> Result<()> {
		let mut rx = self.calls.subscribe();
		let waited = tokio::time::timeout(WAIT_TIMEOUT, async {
			rx.wait_for(|calls| *calls >= count).await.map(|_| ())
		})
		.await
		.map_err(|_| Error::Message(format!("Timed out waiting for {count} search call(s).")))?;

		Ok(waited?)
	}

	fn push(
		&self,
		result: chorus_backend::Result<SearchResponse>,
		release: Option<oneshot::Receiver<()>>,
	) {
		self.replies
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push_back(Reply { result, release });
	}
}
impl Default for MockBackend {
	fn default() -> Self {
		Self::new()
	}
}
impl SearchBackend for MockBackend {
	fn search<'a>(
		&'a self,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, chorus_backend::Result<SearchResponse>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		let reply = self.replies.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		self.calls.send_modify(|calls| *calls += 1);

		Box::pin(async move {
			let Some(reply) = reply else {
				return Err(unavailable("No scripted reply left."));
			};

			if let Some(release) = reply.release {
				let _ = release.await;
			}

			reply.result
		})
	}
}

pub fn doc(id: &str) -> Value {
	serde_json::json!({ "_id": id, "_source": { "title": format!("Document {id}") } })
}

pub fn hits_response(docs: Vec<Value>, total: u64) -> SearchResponse {
	SearchResponse::new(docs, total, None)
}

pub fn empty_response() -> SearchResponse {
	SearchResponse::new(Vec::new(), 0, None)
}

pub fn with_aggregations(mut response: SearchResponse, aggregations: Value) -> SearchResponse {
	response.aggregations = Some(aggregations);

	response
}

fn unavailable(message: &str) -> chorus_backend::Error {
	chorus_backend::Error::Unavailable { message: message.to_string() }
}
