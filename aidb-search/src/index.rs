//! The consolidated index: every record of one ingestion run, sorted.
//!
//! Ordering is `(provider_id, id)` ascending, compared byte-wise (which for
//! UTF-8 equals code-point order). This ordering is the result set for an
//! empty query and the tie-break order for equal relevance scores.

use crate::error::SearchError;
use crate::ranking::search::search_records;
use crate::types::ModelRecord;

/// File name of the consolidated index at the catalog root.
pub const INDEX_FILE_NAME: &str = "models.json";

/// An immutable, sorted snapshot of the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedIndex {
    records: Vec<ModelRecord>,
}

impl ConsolidatedIndex {
    /// Build an index from records in any order.
    pub fn from_records(mut records: Vec<ModelRecord>) -> Self {
        sort_records(&mut records);
        Self { records }
    }

    /// Decode an index from its JSON array form.
    ///
    /// The array is re-sorted on load so a hand-edited or foreign index still
    /// honours the ordering contract.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if `bytes` is not a JSON array of
    /// canonical records.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SearchError> {
        let records: Vec<ModelRecord> =
            serde_json::from_slice(bytes).map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(Self::from_records(records))
    }

    /// Encode the index as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Encode`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, SearchError> {
        serde_json::to_string_pretty(&self.records).map_err(|e| SearchError::Encode(e.to_string()))
    }

    /// Records in index order.
    pub fn records(&self) -> &[ModelRecord] {
        &self.records
    }

    /// Consume the index, returning records in index order.
    pub fn into_records(self) -> Vec<ModelRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by provider and id.
    pub fn get(&self, provider_id: &str, id: &str) -> Option<&ModelRecord> {
        self.records
            .binary_search_by(|r| r.sort_key().cmp(&(provider_id, id)))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Rank this index against `query`. See [`search_records`].
    pub fn search(&self, query: &str, limit: usize) -> Vec<&ModelRecord> {
        search_records(&self.records, query, limit)
    }
}

/// Sort records into consolidated-index order.
pub fn sort_records(records: &mut [ModelRecord]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Whether `records` is in consolidated-index order.
pub fn is_sorted(records: &[ModelRecord]) -> bool {
    records
        .windows(2)
        .all(|pair| pair[0].sort_key() <= pair[1].sort_key())
}
