//! Search filtering for the payments and student views.
//!
//! Records are filtered first and rollups are derived from the surviving
//! subset, so the payments list and the student list always describe the
//! same set of records.

use serde::{Deserialize, Serialize};

use crate::payments::PaymentRecord;

/// A lower-cased free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    query: String,
}

impl SearchFilter {
    /// Creates a filter from raw user input.
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase(),
        }
    }

    /// The lower-cased query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns true if the filter is empty (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Tests a record against this filter.
    #[must_use]
    pub fn matches(&self, record: &PaymentRecord) -> bool {
        matches(record, &self.query)
    }

    /// Keeps the records that match, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [PaymentRecord]) -> Vec<&'a PaymentRecord> {
        if self.is_empty() {
            return records.iter().collect();
        }
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Tests `record` against an already lower-cased query.
///
/// The query must appear somewhere in the record's search haystack; an empty
/// query matches every record.
#[must_use]
pub fn matches(record: &PaymentRecord, query_lowercased: &str) -> bool {
    query_lowercased.is_empty() || haystack(record).contains(query_lowercased)
}

/// Lower-cased, space-joined searchable fields of a record.
#[must_use]
pub fn haystack(record: &PaymentRecord) -> String {
    let fields: [&str; 8] = [
        &record.payment_id,
        &record.entity_id,
        record.entity_name.as_deref().unwrap_or_default(),
        record.department.as_deref().unwrap_or_default(),
        record.level.as_deref().unwrap_or_default(),
        record.payment_type.as_deref().unwrap_or_default(),
        &record.raw_status,
        record.transaction_ref.as_deref().unwrap_or_default(),
    ];
    fields.join(" ").to_lowercase()
}
