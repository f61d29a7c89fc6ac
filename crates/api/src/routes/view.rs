//! Refresh and search commands for the coordinator.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use feedesk_core::search::SearchFilter;
use feedesk_core::view::ViewError;
use feedesk_shared::AppError;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::validate_query;
use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the command routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/refresh", post(request_refresh))
        .route("/search", put(set_search))
}

/// Request to replace the active search.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// New search text; empty clears the search.
    #[serde(default)]
    pub query: String,
}

/// Acknowledgement of an accepted command.
#[derive(Debug, Serialize)]
pub struct CommandAccepted {
    /// Always true.
    pub accepted: bool,
    /// Active search once the command is applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// POST /refresh
async fn request_refresh(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<CommandAccepted>)> {
    state.view.refresh().await.map_err(coordinator_error)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(CommandAccepted {
            accepted: true,
            search: None,
        }),
    ))
}

/// PUT /search
async fn set_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<(StatusCode, Json<CommandAccepted>)> {
    let query = validate_query(&request.query)?;
    let normalized = SearchFilter::new(query).query().to_string();
    state
        .view
        .set_search(query)
        .await
        .map_err(coordinator_error)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(CommandAccepted {
            accepted: true,
            search: Some(normalized),
        }),
    ))
}

fn coordinator_error(err: ViewError) -> ApiError {
    error!(error = %err, "View coordinator rejected a command");
    AppError::Unavailable(err.to_string()).into()
}
