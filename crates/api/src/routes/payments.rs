//! Payment list routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Serialize;

use super::SearchQuery;
use crate::AppState;
use crate::error::ApiResult;
use crate::responses::PaymentResponse;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/payments", get(list_payments))
}

/// Response for the payment list.
#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    /// Search the list was filtered with.
    pub search: String,
    /// Currency of every amount.
    pub currency: String,
    /// Payments before filtering.
    pub total_payments: usize,
    /// Payments after filtering.
    pub payments_shown: usize,
    /// Matching payments, newest first.
    pub payments: Vec<PaymentResponse>,
}

/// GET /payments
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PaymentsResponse>> {
    let (_, projections) = state.view.query(query.text()?);
    Ok(Json(PaymentsResponse {
        search: projections.search.clone(),
        currency: state.currency.to_string(),
        total_payments: projections.total_payments,
        payments_shown: projections.payments_shown(),
        payments: projections
            .payments
            .iter()
            .map(PaymentResponse::from)
            .collect(),
    }))
}
