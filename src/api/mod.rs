//! Online edge API: object retrieval and ranked search over the persisted
//! catalog, fronted by a shared response cache.

pub mod cache;
pub mod handlers;
pub mod server;
pub mod storage;

pub use cache::{CACHE_TTL_SECONDS, ResponseCache};
pub use server::{ApiServer, AppState, router};
pub use storage::{HttpObjectStore, ObjectFetch, ObjectStore, StorageError};
