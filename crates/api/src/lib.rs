//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes reading the coordinator's published view
//! - A WebSocket feed of dashboard updates
//! - Error rendering and response types

pub mod error;
pub mod responses;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use feedesk_core::view::ViewHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running view coordinator.
    pub view: ViewHandle,
    /// Currency code attached to every amount.
    pub currency: Arc<str>,
}

impl AppState {
    /// Creates the state.
    pub fn new(view: ViewHandle, currency: &str) -> Self {
        Self {
            view,
            currency: Arc::from(currency),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
