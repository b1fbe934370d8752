use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

/// Cancelable delayed trigger registered by a widget, typically a search-as-you-type timer.
#[derive(Debug)]
pub struct DebounceHandle {
	id: Uuid,
	abort: AbortHandle,
}
impl DebounceHandle {
	pub fn new(abort: AbortHandle) -> Self {
		Self::with_id(Uuid::new_v4(), abort)
	}

	pub fn with_id(id: Uuid, abort: AbortHandle) -> Self {
		Self { id, abort }
	}

	pub fn from_task<T>(task: &JoinHandle<T>) -> Self {
		Self::new(task.abort_handle())
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	pub fn cancel(&self) {
		self.abort.abort();
	}

	pub fn is_finished(&self) -> bool {
		self.abort.is_finished()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[tokio::test]
	async fn cancel_aborts_the_pending_task() {
		let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
		let handle = DebounceHandle::from_task(&task);

		handle.cancel();

		let err = task.await.expect_err("task should be cancelled");

		assert!(err.is_cancelled());
		assert!(handle.is_finished());
	}
}
