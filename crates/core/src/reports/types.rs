//! Report data types.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::payments::PaymentRecord;

/// Label used for payments without a fee type in history breakdowns.
pub const UNTYPED_PAYMENT_LABEL: &str = "Other";

/// Headline totals over paid records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTotals {
    /// Sum of all paid amounts.
    pub total: Decimal,
    /// Paid amounts classified as tuition.
    pub tuition_total: Decimal,
    /// Paid amounts classified as anything else.
    pub other_total: Decimal,
    /// Number of paid records.
    pub paid_count: u64,
}

/// Paid totals for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRollup {
    /// Student identifier.
    pub entity_id: String,
    /// Display name from the first paid record seen.
    pub name: Option<String>,
    /// Level from the first paid record seen.
    pub level: Option<String>,
    /// Department from the first paid record seen.
    pub department: Option<String>,
    /// Paid tuition.
    pub tuition_sum: Decimal,
    /// Paid non-tuition fees.
    pub other_sum: Decimal,
}

impl EntityRollup {
    pub(crate) fn seeded_from(record: &PaymentRecord) -> Self {
        Self {
            entity_id: record.entity_id.clone(),
            name: record.entity_name.clone(),
            level: record.level.clone(),
            department: record.department.clone(),
            tuition_sum: Decimal::ZERO,
            other_sum: Decimal::ZERO,
        }
    }

    /// Tuition plus other fees.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.tuition_sum.saturating_add(self.other_sum)
    }
}

/// Student rollups in the order each student first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRollups {
    entries: Vec<EntityRollup>,
    index: HashMap<String, usize>,
}

impl EntityRollups {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rollup for a student, creating it from `record` on first sight.
    pub(crate) fn entry_for(&mut self, record: &PaymentRecord) -> &mut EntityRollup {
        let position = match self.index.get(&record.entity_id) {
            Some(&position) => position,
            None => {
                let position = self.entries.len();
                self.entries.push(EntityRollup::seeded_from(record));
                self.index.insert(record.entity_id.clone(), position);
                position
            }
        };
        &mut self.entries[position]
    }

    /// Looks up a student's rollup.
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&EntityRollup> {
        self.index.get(entity_id).map(|&position| &self.entries[position])
    }

    /// Returns true if the student has a rollup.
    #[must_use]
    pub fn contains(&self, entity_id: &str) -> bool {
        self.index.contains_key(entity_id)
    }

    /// Number of students.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no student has a paid record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityRollup> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a EntityRollups {
    type Item = &'a EntityRollup;
    type IntoIter = std::slice::Iter<'a, EntityRollup>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for EntityRollups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Paid total for one fee type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    /// Fee type, or [`UNTYPED_PAYMENT_LABEL`].
    pub payment_type: String,
    /// Paid amount.
    pub amount: Decimal,
}

/// Drill-down for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHistory {
    /// Requested student identifier.
    pub entity_id: String,
    /// Name from the student's first record, if any.
    pub entity_name: Option<String>,
    /// Every record for the student, any status, in ledger order.
    pub records: Vec<PaymentRecord>,
    /// Paid amounts per fee type, in first-seen order.
    pub breakdown: Vec<TypeBreakdown>,
    /// Paid grand total.
    pub total: Decimal,
}

impl EntityHistory {
    /// Name to show for the student, falling back to the requested id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.entity_name.as_deref().unwrap_or(&self.entity_id)
    }

    /// Returns true if no record matched the student.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.records.is_empty()
    }
}
