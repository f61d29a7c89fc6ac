//! Response bodies shared by the view routes.
//!
//! Money is rendered as a decimal string with two places.

use chrono::{DateTime, Utc};
use feedesk_core::payments::PaymentRecord;
use feedesk_core::reports::{EntityRollup, KpiTotals};
use feedesk_core::view::{Projections, PublishedView, ViewState, ViewStatus};
use rust_decimal::Decimal;
use serde::Serialize;

/// Renders an amount for the API.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Headline totals.
#[derive(Debug, Serialize)]
pub struct KpiResponse {
    /// Sum of paid amounts.
    pub total: String,
    /// Paid tuition.
    pub tuition_total: String,
    /// Paid non-tuition fees.
    pub other_total: String,
    /// Number of paid payments.
    pub paid_count: u64,
}

impl From<&KpiTotals> for KpiResponse {
    fn from(kpis: &KpiTotals) -> Self {
        Self {
            total: format_money(kpis.total),
            tuition_total: format_money(kpis.tuition_total),
            other_total: format_money(kpis.other_total),
            paid_count: kpis.paid_count,
        }
    }
}

/// One payment row.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub payment_id: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Student ID.
    pub student_id: String,
    /// Student name.
    pub student_name: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Level.
    pub level: Option<String>,
    /// Fee type.
    pub payment_type: Option<String>,
    /// Amount.
    pub amount: String,
    /// Status as stored.
    pub status: String,
    /// Whether the payment counts towards totals.
    pub paid: bool,
    /// Transaction reference.
    pub transaction_ref: Option<String>,
}

impl From<&PaymentRecord> for PaymentResponse {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            payment_id: record.payment_id.clone(),
            created_at: record.created_at,
            student_id: record.entity_id.clone(),
            student_name: record.entity_name.clone(),
            department: record.department.clone(),
            level: record.level.clone(),
            payment_type: record.payment_type.clone(),
            amount: format_money(record.amount),
            status: record.raw_status.clone(),
            paid: record.is_paid(),
            transaction_ref: record.transaction_ref.clone(),
        }
    }
}

/// One student row.
#[derive(Debug, Serialize)]
pub struct StudentResponse {
    /// Student ID.
    pub student_id: String,
    /// Student name.
    pub name: Option<String>,
    /// Level.
    pub level: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Paid tuition.
    pub tuition: String,
    /// Paid non-tuition fees.
    pub other: String,
    /// Tuition plus other fees.
    pub total: String,
}

impl From<&EntityRollup> for StudentResponse {
    fn from(rollup: &EntityRollup) -> Self {
        Self {
            student_id: rollup.entity_id.clone(),
            name: rollup.name.clone(),
            level: rollup.level.clone(),
            department: rollup.department.clone(),
            tuition: format_money(rollup.tuition_sum),
            other: format_money(rollup.other_sum),
            total: format_money(rollup.total()),
        }
    }
}

/// Coordinator bookkeeping.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Idle or refreshing.
    pub state: ViewState,
    /// Ledger generation.
    pub generation: u64,
    /// Last successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Last fetch failure, if not yet recovered.
    pub last_error: Option<String>,
    /// Whether a record store is configured.
    pub store_ready: bool,
}

impl From<&ViewStatus> for StatusResponse {
    fn from(status: &ViewStatus) -> Self {
        Self {
            state: status.state,
            generation: status.generation,
            refreshed_at: status.refreshed_at,
            last_error: status.last_error.clone(),
            store_ready: status.store_ready,
        }
    }
}

/// The whole dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Active search, lower-cased.
    pub search: String,
    /// Currency of every amount.
    pub currency: String,
    /// Headline totals over every payment.
    pub kpis: KpiResponse,
    /// Payments before filtering.
    pub total_payments: usize,
    /// Payments after filtering.
    pub payments_shown: usize,
    /// Students after filtering.
    pub students_shown: usize,
    /// Matching payments.
    pub payments: Vec<PaymentResponse>,
    /// Paid totals per matching student.
    pub students: Vec<StudentResponse>,
    /// Coordinator bookkeeping.
    pub status: StatusResponse,
}

impl DashboardResponse {
    /// Builds the response from projections and the status they were published with.
    pub fn new(projections: &Projections, status: &ViewStatus, currency: &str) -> Self {
        Self {
            search: projections.search.clone(),
            currency: currency.to_string(),
            kpis: KpiResponse::from(&projections.kpis),
            total_payments: projections.total_payments,
            payments_shown: projections.payments_shown(),
            students_shown: projections.students_shown(),
            payments: projections.payments.iter().map(PaymentResponse::from).collect(),
            students: projections.rollups.iter().map(StudentResponse::from).collect(),
            status: StatusResponse::from(status),
        }
    }

    /// Builds the response for a published view.
    pub fn from_view(view: &PublishedView, currency: &str) -> Self {
        Self::new(&view.projections, &view.status, currency)
    }
}
