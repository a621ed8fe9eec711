//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Backend the connector talks to (`postgres` or `memory`).
    pub store: &'static str,
    pub reservation_mode: &'static str,
}

/// GET /health
///
/// Reports how the process is wired. Liveness only: the store is named, never
/// contacted, so an outage does not turn this endpoint red.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.connector.backend_name(),
        reservation_mode: state.reservation_mode.as_str(),
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
