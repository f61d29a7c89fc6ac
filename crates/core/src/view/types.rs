//! View data types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerSnapshot;
use crate::payments::PaymentRecord;
use crate::reports::{EntityRollups, KpiTotals};
use crate::search::SearchFilter;

/// Input to the coordinator's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Re-fetch the ledger from the record store.
    Refresh,
    /// Replace the active search query.
    SearchChanged(String),
    /// Stop the coordinator.
    Shutdown,
}

/// Whether a fetch is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// No fetch in flight.
    #[default]
    Idle,
    /// A fetch from the record store is outstanding.
    Refreshing,
}

/// Output of one pipeline run over a ledger snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projections {
    /// Lower-cased query the projections were filtered with.
    pub search: String,
    /// Headline totals over the whole ledger.
    pub kpis: KpiTotals,
    /// Records matching the search, in ledger order.
    pub payments: Vec<PaymentRecord>,
    /// Student rollups derived from the matching records.
    pub rollups: EntityRollups,
    /// Number of records in the ledger before filtering.
    pub total_payments: usize,
}

impl Projections {
    /// Number of payments shown after filtering.
    #[must_use]
    pub fn payments_shown(&self) -> usize {
        self.payments.len()
    }

    /// Number of students shown after filtering.
    #[must_use]
    pub fn students_shown(&self) -> usize {
        self.rollups.len()
    }
}

/// Coordinator bookkeeping published alongside the projections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewStatus {
    /// Current coordinator state.
    pub state: ViewState,
    /// Ledger generation the projections were computed from.
    pub generation: u64,
    /// When the ledger was last replaced.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Message of the most recent failed fetch, cleared by the next success.
    pub last_error: Option<String>,
    /// Whether a record store is configured.
    pub store_ready: bool,
}

/// Everything the coordinator publishes after a pipeline run or state change.
#[derive(Debug, Clone, Default)]
pub struct PublishedView {
    /// Coordinator bookkeeping.
    pub status: ViewStatus,
    /// Derived views.
    pub projections: Arc<Projections>,
    /// Ledger snapshot the projections were computed from.
    pub ledger: LedgerSnapshot,
    /// Search the projections were filtered with.
    pub search: SearchFilter,
}

impl PublishedView {
    /// The view published before the first fetch completes.
    #[must_use]
    pub fn initial(store_ready: bool) -> Self {
        Self {
            status: ViewStatus {
                store_ready,
                ..ViewStatus::default()
            },
            ..Self::default()
        }
    }
}
