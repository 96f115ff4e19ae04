pub mod error;
pub mod event;
pub mod query;
pub mod storage;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use event::{Event, EventKind};
pub use query::SearchFilter;
pub use storage::{FileBackend, MemoryBackend, StorageBackend};
pub use store::{sort_events, EventStore};
