//! Student rollup and drill-down routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;

use super::SearchQuery;
use crate::AppState;
use crate::error::ApiResult;
use crate::responses::{PaymentResponse, StudentResponse, format_money};
use feedesk_shared::AppError;

/// Creates the student routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students))
        .route("/students/{student_id}/history", get(get_history))
}

/// Response for the student list.
#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    /// Search the list was filtered with.
    pub search: String,
    /// Currency of every amount.
    pub currency: String,
    /// Students after filtering.
    pub students_shown: usize,
    /// Paid totals per student, in first-seen order.
    pub students: Vec<StudentResponse>,
}

/// Paid total for one fee type.
#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    /// Fee type.
    pub payment_type: String,
    /// Paid amount.
    pub amount: String,
}

/// Response for one student's history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Requested student ID.
    pub student_id: String,
    /// Name to show, falling back to the ID.
    pub name: String,
    /// Whether any payment exists for the student.
    pub known: bool,
    /// Currency of every amount.
    pub currency: String,
    /// Paid grand total.
    pub total: String,
    /// Paid amounts per fee type.
    pub breakdown: Vec<BreakdownResponse>,
    /// Every payment for the student, any status.
    pub payments: Vec<PaymentResponse>,
}

/// GET /students
async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<StudentsResponse>> {
    let (_, projections) = state.view.query(query.text()?);
    Ok(Json(StudentsResponse {
        search: projections.search.clone(),
        currency: state.currency.to_string(),
        students_shown: projections.students_shown(),
        students: projections
            .rollups
            .iter()
            .map(StudentResponse::from)
            .collect(),
    }))
}

/// GET /students/{student_id}/history
async fn get_history(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<HistoryResponse>> {
    if student_id.trim().is_empty() {
        return Err(AppError::Validation("student_id must not be blank".to_string()).into());
    }

    let history = state.view.history(&student_id);
    Ok(Json(HistoryResponse {
        student_id: history.entity_id.clone(),
        name: history.display_name().to_string(),
        known: !history.is_unknown(),
        currency: state.currency.to_string(),
        total: format_money(history.total),
        breakdown: history
            .breakdown
            .iter()
            .map(|line| BreakdownResponse {
                payment_type: line.payment_type.clone(),
                amount: format_money(line.amount),
            })
            .collect(),
        payments: history.records.iter().map(PaymentResponse::from).collect(),
    }))
}
