//! aidb: an AI model catalog.
//!
//! The catalog is built offline and served online:
//! Upstream feed → Builder → Writer → object store → Edge API
//!
//! # Architecture
//!
//! - **Ingestion** ([`ingest`]): fetches the upstream feed (or scrapes the
//!   Ollama library), normalises every model into a canonical
//!   [`ModelRecord`] and persists one object per model plus the sorted
//!   consolidated index `models.json`
//! - **Ranking** ([`aidb_search`]): pure keyword ranking over the index
//! - **Edge API** ([`api`]): object retrieval and search over HTTP, behind a
//!   shared response cache

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod ingest;

pub use aidb_search::{ConsolidatedIndex, ModelRecord};
pub use api::{ApiServer, HttpObjectStore, ObjectStore};
pub use config::AidbConfig;
pub use error::{CatalogError, Result};
pub use ingest::{IngestReport, RecordFailure, run_ingest};
