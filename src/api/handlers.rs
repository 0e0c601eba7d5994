//! Request handlers for object retrieval and search.

use aidb_search::{ConsolidatedIndex, INDEX_FILE_NAME};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::server::AppState;
use super::storage::{ObjectFetch, ObjectStore, StorageError};

/// `{"error": message}` with `status`.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `GET /{object_name}.json`: the stored object, verbatim.
pub async fn get_object<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Path(object_name): Path<String>,
) -> Response {
    let Some(stem) = object_name.strip_suffix(".json") else {
        return not_found().await;
    };
    if stem.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing object name");
    }

    match state.store.fetch(&object_name).await {
        Ok(ObjectFetch::Found(body)) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Ok(ObjectFetch::Missing(status)) => {
            tracing::debug!(object = %object_name, status, "object not found");
            error_response(StatusCode::NOT_FOUND, "Object not found")
        }
        // A key the store cannot address names no object.
        Err(StorageError::InvalidKey(key)) => {
            tracing::debug!(object = %key, "object key not addressable");
            error_response(StatusCode::NOT_FOUND, "Object not found")
        }
        Err(e) => {
            tracing::error!(object = %object_name, error = %e, "error retrieving object");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request")
        }
    }
}

/// Query parameters of `/search`. A repeated key keeps its first value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    /// Pick `q` and `limit` out of decoded query pairs. Unknown keys are
    /// ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" if params.q.is_none() => params.q = Some(value),
                "limit" if params.limit.is_none() => params.limit = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// `GET /search?q=&limit=`: ranked records from the consolidated index.
pub async fn search<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = SearchParams::from_pairs(pairs);
    let query = match params.q.as_deref() {
        Some(q) if !q.is_empty() => q,
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing query parameter"),
    };
    let limit = state.limits.parse(params.limit.as_deref());

    let body = match state.store.fetch(INDEX_FILE_NAME).await {
        Ok(ObjectFetch::Found(body)) => body,
        Ok(ObjectFetch::Missing(status)) => {
            tracing::error!(status, "consolidated index unavailable");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Search failed");
        }
        Err(e) => {
            tracing::error!(error = %e, "error searching");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    };

    let index = match ConsolidatedIndex::from_json(&body) {
        Ok(index) => index,
        Err(e) => {
            tracing::error!(error = %e, "consolidated index is malformed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    };

    let results = index.search(query, limit);
    tracing::debug!(query, limit, hits = results.len(), "search");
    Json(results).into_response()
}

/// Fallback for every other path.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
