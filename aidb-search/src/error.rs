//! Error types for the aidb-search crate.
//!
//! Messages are stable lower-case strings so callers can surface them
//! directly or match on the variant.

/// Errors raised while decoding or encoding catalog data.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The consolidated index or a record could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// A record or index could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid search limits.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for aidb-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
