//! Health and readiness probes

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use quill_core::{EntityIdType, NotebookId};
use quill_xml::SchemaKind;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

/// GET /health/ping
async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
async fn live() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /health/ready
///
/// Ready means the schema registry is loaded and the store answers.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.schemas.source(SchemaKind::Note).is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "degraded" }),
        );
    }
    match state
        .store
        .note_count_by_notebook(NotebookId::generate())
        .await
    {
        Ok(_) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "degraded" }),
        ),
    }
}
