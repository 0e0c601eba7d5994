//! # aidb-search
//!
//! Canonical model records and keyword ranking for the aidb catalog.
//!
//! This crate is pure: it performs no I/O. It defines the record schema
//! every other part of aidb agrees on, the sorted consolidated index, the
//! limit rules for search requests and the ranking engine itself.
//!
//! ## Ranking
//!
//! - The query is lower-cased and split on whitespace into terms
//! - Every term must match the record id or provider id (AND semantics)
//! - Matches are weighted by tier: id substring 10, provider substring 6,
//!   id word 3, provider word 1
//! - Results are sorted by score, ties keep consolidated-index order
//! - A blank query returns the head of the index unscored

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ranking;
pub mod types;

pub use config::{SearchLimits, parse_limit};
pub use engine::Rankable;
pub use error::{Result, SearchError};
pub use index::{ConsolidatedIndex, INDEX_FILE_NAME};
pub use types::{Capability, Cost, Limit, Modalities, Modality, ModelRecord};

/// Search `records` (in consolidated-index order) for `query`.
///
/// Returns at most `limit` records, best match first. A blank query returns
/// the first `limit` records unchanged.
///
/// # Examples
///
/// ```
/// # use aidb_search::Rankable;
/// struct Entry(&'static str, &'static str);
/// impl Rankable for Entry {
///     fn record_id(&self) -> &str { self.0 }
///     fn provider_id(&self) -> &str { self.1 }
/// }
///
/// let records = [Entry("claude-3", "anthropic"), Entry("gpt-4o", "openai")];
/// let results = aidb_search::search(&records, "gpt", 5);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].0, "gpt-4o");
/// ```
pub fn search<'a, R: Rankable>(records: &'a [R], query: &str, limit: usize) -> Vec<&'a R> {
    ranking::search::search_records(records, query, limit)
}
