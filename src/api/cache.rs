//! Shared response cache for the edge API.
//!
//! Successful GET responses are stored whole (status, headers, body) keyed
//! by method and full URL, and replayed without touching the handler for
//! [`CACHE_TTL_SECONDS`]. Uses [`moka`] for async-friendly caching with TTL
//! eviction.

use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use moka::future::Cache;

use super::handlers::error_response;

/// Freshness lifetime of a cached response.
pub const CACHE_TTL_SECONDS: u64 = 3600;

/// Maximum number of cached responses.
const MAX_CACHE_ENTRIES: u64 = 10_000;

/// Largest body the cache will buffer.
const MAX_CACHED_BODY_BYTES: usize = 64 * 1024 * 1024;

/// `Cache-Control` value set on cacheable responses.
pub fn cache_control_value() -> HeaderValue {
    HeaderValue::from_static("max-age=3600")
}

/// Method plus full request URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: Method,
    url: String,
}

impl CacheKey {
    /// Build the key for `request`. The host comes from the `Host` header
    /// since server-side request URIs are usually origin-form.
    pub fn for_request(request: &Request) -> Self {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default();
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self {
            method: request.method().clone(),
            url: format!("{host}{path_and_query}"),
        }
    }
}

/// A stored response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Process-wide response cache. Cloning shares the same storage.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<CacheKey, CachedResponse>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// A cache with the standard one-hour lifetime.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(CACHE_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, response: CachedResponse) {
        self.inner.insert(key, response).await;
    }

    /// Approximate number of live entries.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Middleware serving GET requests from `cache` and storing successful
/// responses.
///
/// Only 2xx responses are stored and only they receive
/// `Cache-Control: max-age=3600`; error responses pass through untouched so
/// a transient backend failure is retried on the next request.
pub async fn cache_responses(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = CacheKey::for_request(&request);
    if let Some(hit) = cache.get(&key).await {
        tracing::trace!(url = %key.url, "cache hit");
        return hit.into_response();
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let body = match to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(url = %key.url, error = %e, "failed to buffer response body");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    };
    parts
        .headers
        .insert(header::CACHE_CONTROL, cache_control_value());

    let cached = CachedResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    };
    tracing::trace!(url = %key.url, "cache store");
    cache.insert(key, cached.clone()).await;
    cached.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, host: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn key_includes_host_path_and_query() {
        let a = CacheKey::for_request(&request("/search?q=gpt&limit=3", "api.example"));
        let b = CacheKey::for_request(&request("/search?q=gpt&limit=4", "api.example"));
        let c = CacheKey::for_request(&request("/search?q=gpt&limit=3", "other.example"));
        assert_eq!(a.url, "api.example/search?q=gpt&limit=3");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, CacheKey::for_request(&request("/search?q=gpt&limit=3", "api.example")));
    }

    #[tokio::test]
    async fn insert_then_get() {
        let cache = ResponseCache::new();
        let key = CacheKey::for_request(&request("/models.json", "api.example"));
        assert!(cache.get(&key).await.is_none());
        cache
            .insert(
                key.clone(),
                CachedResponse {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    body: Bytes::from_static(b"[]"),
                },
            )
            .await;
        let hit = cache.get(&key).await.expect("hit");
        assert_eq!(hit.body, Bytes::from_static(b"[]"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(50));
        let key = CacheKey::for_request(&request("/a.json", "h"));
        cache
            .insert(
                key.clone(),
                CachedResponse {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    body: Bytes::new(),
                },
            )
            .await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn cache_control_matches_ttl() {
        assert_eq!(
            cache_control_value(),
            format!("max-age={CACHE_TTL_SECONDS}").as_str()
        );
    }
}
