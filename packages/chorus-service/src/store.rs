use std::{
	collections::BTreeMap,
	sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use chorus_backend::SearchRequest;
use chorus_domain::{Instruction, SortDirection};

use crate::debounce::DebounceHandle;

/// Index and type selectors the full request is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeader {
	pub index: String,
	pub r#type: Option<String>,
}

/// How a widget wants its standalone bucket list requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
	pub name: String,
	pub field: String,
	pub size: u64,
	/// Set by widgets whose bucket list follows the current query; read back through
	/// [`SearchStore::dynamic_aggregations`] to pick what to re-request after a fetch.
	pub is_dynamic: bool,
	pub order_key: String,
	pub order_direction: SortDirection,
}

struct StoreState {
	header: RequestHeader,
	instructions: Vec<Instruction>,
	body: Value,
	debounces: Vec<DebounceHandle>,
	aggregations: BTreeMap<String, AggregationSettings>,
	items: Vec<Value>,
	score: u64,
	generation: u64,
}
impl Default for StoreState {
	fn default() -> Self {
		Self {
			header: RequestHeader::default(),
			instructions: Vec::new(),
			body: Value::Object(Map::new()),
			debounces: Vec::new(),
			aggregations: BTreeMap::new(),
			items: Vec::new(),
			score: 0,
			generation: 0,
		}
	}
}

/// Shared search state handed to every widget.
///
/// Cloning yields another handle onto the same state. Every write goes through a named commit
/// method and the lock is never held across an await.
#[derive(Clone, Default)]
pub struct SearchStore {
	inner: Arc<Mutex<StoreState>>,
}
impl SearchStore {
	pub fn new(header: RequestHeader) -> Self {
		let store = Self::default();

		store.state().header = header;

		store
	}

	pub fn set_index(&self, index: impl Into<String>) {
		self.state().header.index = index.into();
	}

	pub fn set_type(&self, r#type: Option<String>) {
		self.state().header.r#type = r#type;
	}

	pub fn set_body(&self, body: Value) {
		self.state().body = body;
	}

	pub fn add_instruction(&self, instruction: Instruction) {
		self.state().instructions.push(instruction);
	}

	/// Removes the first instruction structurally equal to `instruction`.
	///
	/// Duplicates are kept as separate entries, so each `add_instruction` needs its own
	/// `remove_instruction`. Returns `false` when nothing matched.
	pub fn remove_instruction(&self, instruction: &Instruction) -> bool {
		let mut state = self.state();
		let Some(position) = state.instructions.iter().position(|existing| existing == instruction)
		else {
			return false;
		};

		state.instructions.remove(position);

		true
	}

	pub fn clear_instructions(&self) {
		self.state().instructions.clear();
	}

	pub fn set_aggregations(&self, settings: AggregationSettings) {
		self.state().aggregations.insert(settings.name.clone(), settings);
	}

	pub fn add_debounce(&self, handle: DebounceHandle) -> Uuid {
		let id = handle.id();

		self.state().debounces.push(handle);

		id
	}

	/// Takes a handle out of the pending set without cancelling it.
	pub fn withdraw_debounce(&self, id: Uuid) -> Option<DebounceHandle> {
		let mut state = self.state();
		let position = state.debounces.iter().position(|handle| handle.id() == id)?;

		Some(state.debounces.swap_remove(position))
	}

	/// Cancels and forgets every pending debounce, returning how many were pending.
	pub fn reset_debounce(&self) -> usize {
		let pending = std::mem::take(&mut self.state().debounces);

		for handle in &pending {
			handle.cancel();
		}

		pending.len()
	}

	/// Replaces the result set and score when `generation` is still the latest fetch.
	///
	/// The generation check and both writes happen under a single lock acquisition. Returns
	/// `false` without touching anything when a newer fetch has been issued.
	pub fn commit_hits(&self, generation: u64, items: Vec<Value>, score: u64) -> bool {
		let mut state = self.state();

		if state.generation != generation {
			return false;
		}

		state.items = items;
		state.score = score;

		true
	}

	/// Zeroes the score after a failed fetch, keeping the previous result set.
	///
	/// Same generation rule as [`Self::commit_hits`].
	pub fn commit_failure(&self, generation: u64) -> bool {
		let mut state = self.state();

		if state.generation != generation {
			return false;
		}

		state.score = 0;

		true
	}

	/// Issues the token for a new fetch; any older token stops being current.
	pub fn next_generation(&self) -> u64 {
		let mut state = self.state();

		state.generation += 1;

		state.generation
	}

	pub fn is_current_generation(&self, generation: u64) -> bool {
		self.state().generation == generation
	}

	pub fn header(&self) -> RequestHeader {
		self.state().header.clone()
	}

	pub fn body(&self) -> Value {
		self.state().body.clone()
	}

	pub fn instructions(&self) -> Vec<Instruction> {
		self.state().instructions.clone()
	}

	pub fn aggregations(&self) -> Vec<AggregationSettings> {
		self.state().aggregations.values().cloned().collect()
	}

	pub fn dynamic_aggregations(&self) -> Vec<AggregationSettings> {
		self.state().aggregations.values().filter(|settings| settings.is_dynamic).cloned().collect()
	}

	pub fn aggregation(&self, name: &str) -> Option<AggregationSettings> {
		self.state().aggregations.get(name).cloned()
	}

	pub fn pending_debounces(&self) -> usize {
		self.state().debounces.len()
	}

	pub fn items(&self) -> Vec<Value> {
		self.state().items.clone()
	}

	pub fn score(&self) -> u64 {
		self.state().score
	}

	/// Full request derived from the current header and body; never stored.
	pub fn request(&self) -> SearchRequest {
		let state = self.state();

		SearchRequest::new(state.header.index.clone(), state.header.r#type.clone(), state.body.clone())
	}

	fn state(&self) -> MutexGuard<'_, StoreState> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}
