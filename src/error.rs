//! Error types for the aidb ingestion pipeline and edge API.

use std::path::PathBuf;

use crate::ingest::validate::ValidationError;

/// Top-level error type for catalog ingestion and serving.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The upstream feed could not be fetched or returned a non-success status.
    #[error("upstream fetch error: {0}")]
    Fetch(String),

    /// An HTTP client could not be built or a request could not be formed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A document could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// A single record was rejected by validation.
    #[error("invalid record: {0}")]
    Rejected(#[from] ValidationError),

    /// A directory held no model files to combine.
    #[error("no model files found in {}", .0.display())]
    EmptyCatalog(PathBuf),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The edge API server failed to start or stopped unexpectedly.
    #[error("server error: {0}")]
    Server(String),

    /// Encoding or decoding of canonical records failed.
    #[error(transparent)]
    Search(#[from] aidb_search::SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CatalogError>;
