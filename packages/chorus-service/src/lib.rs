pub mod compiler;
pub mod coordinator;
pub mod debounce;
pub mod store;

mod error;

pub use chorus_backend::{BoxFuture, SearchBackend, SearchRequest, SearchResponse};
pub use chorus_domain::{Instruction, RawInstruction, SortDirection};
pub use compiler::Paging;
pub use coordinator::{FetchOutcome, SearchCoordinator};
pub use debounce::DebounceHandle;
pub use error::{Error, Result};
pub use store::{AggregationSettings, RequestHeader, SearchStore};
