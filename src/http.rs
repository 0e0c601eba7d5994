//! Shared HTTP client construction.
//!
//! One [`reqwest::Client`] is built per ingestion run or server process and
//! reused for every request it makes.

use std::time::Duration;

use crate::error::CatalogError;

/// User-Agent sent when none is configured.
pub fn default_user_agent() -> String {
    format!("aidb/{}", env!("CARGO_PKG_VERSION"))
}

/// Build a [`reqwest::Client`] with the given timeout and User-Agent.
///
/// The client follows up to 10 redirects and transparently decompresses
/// gzip responses.
///
/// # Errors
///
/// Returns [`CatalogError::Http`] if the client cannot be constructed.
pub fn build_client(
    timeout_seconds: u64,
    user_agent: Option<&str>,
) -> Result<reqwest::Client, CatalogError> {
    let ua = match user_agent {
        Some(custom) => custom.to_owned(),
        None => default_user_agent(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| CatalogError::Http(format!("failed to build HTTP client: {e}")))
}
