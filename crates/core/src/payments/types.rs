//! Payment record types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// A single payment as supplied by the record store.
///
/// Records are immutable once received. Every field degrades to an empty or
/// zero value when the upstream row is malformed, so a dirty row never
/// aborts a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRecord {
    /// Payment identifier, unique within one ledger snapshot.
    #[serde(deserialize_with = "lenient::string")]
    pub payment_id: String,
    /// Creation time, absent when missing or unparseable.
    #[serde(deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Paying entity (student) identifier.
    #[serde(rename = "student_id", deserialize_with = "lenient::string")]
    pub entity_id: String,
    /// Display name of the paying entity.
    #[serde(rename = "student_name", deserialize_with = "lenient::optional_string")]
    pub entity_name: Option<String>,
    /// Department of the paying entity.
    #[serde(deserialize_with = "lenient::optional_string")]
    pub department: Option<String>,
    /// Level of the paying entity.
    #[serde(deserialize_with = "lenient::optional_string")]
    pub level: Option<String>,
    /// Free-text fee category.
    #[serde(deserialize_with = "lenient::optional_string")]
    pub payment_type: Option<String>,
    /// Amount in the single reporting currency.
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: Decimal,
    /// Raw status text; see [`PaymentRecord::status`].
    #[serde(rename = "status", deserialize_with = "lenient::string")]
    pub raw_status: String,
    /// External transaction reference.
    #[serde(deserialize_with = "lenient::optional_string")]
    pub transaction_ref: Option<String>,
}

impl PaymentRecord {
    /// Creates a record with the fields every aggregation looks at.
    #[must_use]
    pub fn new(
        payment_id: impl Into<String>,
        entity_id: impl Into<String>,
        payment_type: impl Into<String>,
        amount: Decimal,
        status: impl Into<String>,
    ) -> Self {
        Self {
            payment_id: payment_id.into(),
            entity_id: entity_id.into(),
            payment_type: Some(payment_type.into()),
            amount,
            raw_status: status.into(),
            ..Self::default()
        }
    }

    /// Sets the entity display name.
    #[must_use]
    pub fn with_entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Sets the entity department.
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Sets the entity level.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the external transaction reference.
    #[must_use]
    pub fn with_transaction_ref(mut self, transaction_ref: impl Into<String>) -> Self {
        self.transaction_ref = Some(transaction_ref.into());
        self
    }

    /// Returns the classified status.
    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::parse(&self.raw_status)
    }

    /// Returns true if the payment counts towards paid totals.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status() == PaymentStatus::Paid
    }

    /// Returns the tuition/other classification of the payment type.
    #[must_use]
    pub fn category(&self) -> PaymentCategory {
        PaymentCategory::classify(self.payment_type.as_deref().unwrap_or_default())
    }
}

/// Payment status, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Settled payment; the only status that counts towards totals.
    Paid,
    /// Awaiting settlement.
    Pending,
    /// Returned to the payer.
    Refunded,
    /// Anything else, including an empty status.
    Unknown,
}

impl PaymentStatus {
    /// Classifies raw status text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("paid") {
            Self::Paid
        } else if raw.eq_ignore_ascii_case("pending") {
            Self::Pending
        } else if raw.eq_ignore_ascii_case("refunded") {
            Self::Refunded
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::Pending => write!(f, "pending"),
            Self::Refunded => write!(f, "refunded"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Fee category used to split totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    /// Any payment type mentioning tuition.
    Tuition,
    /// Everything else.
    Other,
}

impl PaymentCategory {
    /// Classifies a payment type: tuition if it contains "tuition" in any case.
    #[must_use]
    pub fn classify(payment_type: &str) -> Self {
        if payment_type.to_lowercase().contains("tuition") {
            Self::Tuition
        } else {
            Self::Other
        }
    }
}
