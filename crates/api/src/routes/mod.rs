//! API route definitions.

use axum::Router;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use feedesk_shared::AppError;

pub mod dashboard;
pub mod health;
pub mod payments;
pub mod students;
pub mod view;

/// Longest accepted search query, in characters.
pub const MAX_QUERY_CHARS: usize = 256;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(dashboard::routes())
        .merge(payments::routes())
        .merge(students::routes())
        .merge(view::routes())
}

/// Optional free-text search parameter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search text; absent means the coordinator's active search.
    pub q: Option<String>,
}

impl SearchQuery {
    /// The validated query text.
    pub fn text(&self) -> Result<Option<&str>, ApiError> {
        match self.q.as_deref() {
            Some(q) => validate_query(q).map(Some),
            None => Ok(None),
        }
    }
}

/// Rejects queries that are too long to be a real search.
pub fn validate_query(query: &str) -> Result<&str, ApiError> {
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "search query exceeds {MAX_QUERY_CHARS} characters"
        ))
        .into());
    }
    Ok(query)
}
