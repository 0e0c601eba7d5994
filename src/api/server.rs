//! Edge API server.
//!
//! ## Endpoints
//!
//! - `GET /search?q=&limit=` ranked keyword search over `models.json`
//! - `GET /{object}.json` a stored object, verbatim
//!
//! Both routes sit behind the shared [`ResponseCache`]; every response
//! carries permissive CORS headers.

use std::net::SocketAddr;
use std::sync::Arc;

use aidb_search::SearchLimits;
use axum::Router;
use axum::http::Method;
use axum::middleware;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::cache::{ResponseCache, cache_responses};
use super::handlers::{get_object, not_found, search};
use super::storage::ObjectStore;
use crate::config::ApiConfig;
use crate::error::{CatalogError, Result};

/// Shared per-request state.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub limits: SearchLimits,
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            limits: self.limits,
        }
    }
}

/// Build the edge API router over `store`.
pub fn router<S: ObjectStore>(store: Arc<S>, cache: ResponseCache) -> Router {
    let state = AppState {
        store,
        limits: SearchLimits::default(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/search", get(search::<S>))
        .route("/{*object_name}", get(get_object::<S>))
        .route_layer(middleware::from_fn_with_state(cache, cache_responses))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Edge API bound to a local address and served in a background task.
pub struct ApiServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Bind to `{config.host}:{config.port}` (port `0` picks a free port)
    /// and start serving.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Server`] if the listener cannot bind.
    pub async fn start<S: ObjectStore>(store: Arc<S>, config: &ApiConfig) -> Result<Self> {
        Self::start_with_cache(store, ResponseCache::new(), config).await
    }

    /// Like [`ApiServer::start`] with a caller-supplied cache.
    pub async fn start_with_cache<S: ObjectStore>(
        store: Arc<S>,
        cache: ResponseCache,
        config: &ApiConfig,
    ) -> Result<Self> {
        let app = router(store, cache);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| CatalogError::Server(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| CatalogError::Server(format!("failed to get local addr: {e}")))?;

        info!("edge API listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("edge API server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }

    /// Wait for the server task to end (it only ends on error or abort).
    pub async fn wait(&mut self) {
        let _ = (&mut self.handle).await;
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
