//! Object-storage backend seen by the edge API.
//!
//! The backend is an opaque key → blob store. The API only ever reads from
//! it, and only needs to tell three outcomes apart: the object exists, the
//! backend answered without it, or the backend could not be reached.

use std::future::Future;

use bytes::Bytes;
use url::Url;

/// Failure to talk to the backend at all.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key cannot be turned into a backend URL.
    #[error("invalid object key `{0}`")]
    InvalidKey(String),

    /// Connection, timeout or body read failure.
    #[error("storage transport error: {0}")]
    Transport(String),
}

/// Outcome of a successful round trip to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFetch {
    /// The object body, verbatim.
    Found(Bytes),
    /// The backend answered with this non-success status.
    Missing(u16),
}

/// Read-only access to catalog objects.
pub trait ObjectStore: Send + Sync + 'static {
    /// Fetch the object stored under `key` (e.g. `openai/gpt-4o.json`).
    fn fetch(&self, key: &str) -> impl Future<Output = Result<ObjectFetch, StorageError>> + Send;
}

/// [`ObjectStore`] over plain HTTP: `GET {base_url}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpObjectStore {
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `base_url` cannot hold path
    /// segments.
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url).map_err(|_| StorageError::InvalidKey(base_url.to_owned()))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidKey(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Resolve `key` below the base URL.
    ///
    /// Each `/`-separated segment of the key is appended (and escaped) in
    /// turn; empty, `.` and `..` segments are refused so a key can never
    /// step outside the base path.
    pub fn object_url(&self, key: &str) -> Result<Url, StorageError> {
        let segments: Vec<&str> = key.split('/').collect();
        if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::InvalidKey(key.to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, key: &str) -> Result<ObjectFetch, StorageError> {
        let url = self.object_url(key)?;
        tracing::trace!(%url, "fetching object");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "object missing");
            return Ok(ObjectFetch::Missing(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(format!("{url}: failed to read body: {e}")))?;
        Ok(ObjectFetch::Found(body))
    }
}
