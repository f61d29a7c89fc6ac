//! Aggregation service.

use rust_decimal::Decimal;

use super::types::{
    EntityHistory, EntityRollups, KpiTotals, TypeBreakdown, UNTYPED_PAYMENT_LABEL,
};
use crate::payments::{PaymentCategory, PaymentRecord};

/// Service for reducing payment records into report views.
///
/// Every operation is a single pass over the records it is given and keeps
/// no state between calls. Sums saturate at the `Decimal` bounds.
pub struct AggregationService;

impl AggregationService {
    /// Computes the headline totals over paid records.
    #[must_use]
    pub fn compute_kpi_totals<'a, I>(records: I) -> KpiTotals
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        let mut totals = KpiTotals::default();

        for record in records.into_iter().filter(|r| r.is_paid()) {
            totals.paid_count += 1;
            totals.total = totals.total.saturating_add(record.amount);
            match record.category() {
                PaymentCategory::Tuition => {
                    totals.tuition_total = totals.tuition_total.saturating_add(record.amount);
                }
                PaymentCategory::Other => {
                    totals.other_total = totals.other_total.saturating_add(record.amount);
                }
            }
        }

        totals
    }

    /// Computes per-student paid totals.
    ///
    /// The first paid record of a student supplies its name, level and
    /// department; later records only add to the sums. Students without a
    /// paid record get no rollup.
    #[must_use]
    pub fn compute_entity_rollups<'a, I>(records: I) -> EntityRollups
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        let mut rollups = EntityRollups::new();

        for record in records.into_iter().filter(|r| r.is_paid()) {
            let entry = rollups.entry_for(record);
            match record.category() {
                PaymentCategory::Tuition => {
                    entry.tuition_sum = entry.tuition_sum.saturating_add(record.amount);
                }
                PaymentCategory::Other => {
                    entry.other_sum = entry.other_sum.saturating_add(record.amount);
                }
            }
        }

        rollups
    }

    /// Builds the drill-down for one student.
    ///
    /// All of the student's records are listed; only paid ones feed the
    /// breakdown and total. An unknown student yields an empty history.
    #[must_use]
    pub fn compute_entity_history<'a, I>(records: I, entity_id: &str) -> EntityHistory
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        let matching: Vec<PaymentRecord> = records
            .into_iter()
            .filter(|r| r.entity_id == entity_id)
            .cloned()
            .collect();

        let mut breakdown: Vec<TypeBreakdown> = Vec::new();
        let mut total = Decimal::ZERO;

        for record in matching.iter().filter(|r| r.is_paid()) {
            let label = match record.payment_type.as_deref() {
                Some(payment_type) if !payment_type.is_empty() => payment_type,
                _ => UNTYPED_PAYMENT_LABEL,
            };
            match breakdown.iter_mut().find(|b| b.payment_type == label) {
                Some(existing) => existing.amount = existing.amount.saturating_add(record.amount),
                None => breakdown.push(TypeBreakdown {
                    payment_type: label.to_string(),
                    amount: record.amount,
                }),
            }
            total = total.saturating_add(record.amount);
        }

        EntityHistory {
            entity_id: entity_id.to_string(),
            entity_name: matching.first().and_then(|r| r.entity_name.clone()),
            records: matching,
            breakdown,
            total,
        }
    }
}
