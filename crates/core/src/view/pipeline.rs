//! Filter and aggregate one ledger snapshot.

use crate::payments::PaymentRecord;
use crate::reports::AggregationService;
use crate::search::SearchFilter;

use super::types::Projections;

/// Runs the pipeline over `records`.
///
/// KPI totals cover the whole snapshot. The payments list and the student
/// rollups both come from the records that pass `filter`, so they always
/// describe the same subset.
#[must_use]
pub fn project(records: &[PaymentRecord], filter: &SearchFilter) -> Projections {
    let kpis = AggregationService::compute_kpi_totals(records);
    let matching = filter.apply(records);
    let rollups = AggregationService::compute_entity_rollups(matching.iter().copied());

    Projections {
        search: filter.query().to_string(),
        kpis,
        payments: matching.into_iter().cloned().collect(),
        rollups,
        total_payments: records.len(),
    }
}
