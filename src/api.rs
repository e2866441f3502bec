//! HTTP API over a [`StorageProvider`].
//!
//! Endpoints:
//!   POST /objects?name=report.pdf     → store request body, returns metadata (JSON)
//!   GET  /objects                     → list all objects (JSON)
//!   GET  /objects/{id}                → raw object content
//!   GET  /objects/{id}/meta           → object metadata (JSON)
//!
//! Successful JSON responses are wrapped as `{"data": ...}`; failures as
//! `{"error": "..."}`.

use std::io::{Cursor, Read};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::error::{Result, StoreError};
use crate::storage::StorageProvider;

/// Shared state passed to all handlers.
pub struct AppState {
    pub storage: Arc<dyn StorageProvider>,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Arc<Self> {
        Arc::new(Self { storage })
    }
}

// ──────────────── request / response types ────────────────────────────────

#[derive(Deserialize)]
pub struct PutParams {
    name: Option<String>,
}

// ──────────────── router ──────────────────────────────────────────────────

/// Build the axum router.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/objects", get(handle_list).post(handle_put))
        .route("/objects/{id}", get(handle_get))
        .route("/objects/{id}/meta", get(handle_meta))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until the listener fails or `shutdown`
/// resolves.
pub async fn start_server(
    state: Arc<AppState>,
    api: &ApiConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state, api.max_upload_bytes());
    let addr = api.addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(port = api.port, "Object storage listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// HTTP status for each failure class.
pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        StoreError::Write(_)
        | StoreError::IdGeneration(_)
        | StoreError::Io(_)
        | StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: StoreError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    (status, axum::Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

fn data_response<T: serde::Serialize>(data: T) -> Response {
    (StatusCode::OK, axum::Json(serde_json::json!({"data": data}))).into_response()
}

/// Run a blocking storage call off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}

// ──────────────── handlers ────────────────────────────────────────────────

/// The body is buffered in memory, bounded by `api.max_upload_mb`, before
/// the engine copies it to disk.
async fn handle_put(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PutParams>,
    body: Bytes,
) -> Response {
    let name = match params.name.filter(|n| !n.trim().is_empty()) {
        Some(n) => n,
        None => {
            return error_response(StoreError::InvalidRequest(
                "query parameter 'name' is required".into(),
            ))
        }
    };

    let storage = state.storage.clone();
    match run_blocking(move || storage.put(&name, &mut Cursor::new(body))).await {
        Ok(object) => data_response(object),
        Err(e) => error_response(e),
    }
}

async fn handle_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let storage = state.storage.clone();
    let read = run_blocking(move || {
        let mut reader = storage.get(&id)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    })
    .await;

    match read {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "application/octet-stream")],
            body,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_meta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.storage.stat(&id) {
        Ok(object) => data_response(object),
        Err(e) => error_response(e),
    }
}

async fn handle_list(State(state): State<Arc<AppState>>) -> Response {
    data_response(state.storage.list())
}
