//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether a record store is configured.
    pub store_ready: bool,
    /// Whether the view coordinator is running.
    pub coordinator_running: bool,
    /// Ledger generation currently served.
    pub generation: u64,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.view.status();
    let running = state.view.is_running();
    let healthy = running && status.store_ready && status.last_error.is_none();

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store_ready: status.store_ready,
        coordinator_running: running,
        generation: status.generation,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
