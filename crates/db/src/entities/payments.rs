//! `SeaORM` Entity for payments table.

use chrono::Utc;
use feedesk_core::payments::PaymentRecord;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_id: String,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub payment_type: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub transaction_ref: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PaymentRecord {
    fn from(row: Model) -> Self {
        Self {
            payment_id: row.payment_id,
            created_at: row.created_at.map(|at| at.with_timezone(&Utc)),
            entity_id: row.student_id.unwrap_or_default(),
            entity_name: row.student_name,
            department: row.department,
            level: row.level,
            payment_type: row.payment_type,
            amount: row.amount.unwrap_or(Decimal::ZERO),
            raw_status: row.status.unwrap_or_default(),
            transaction_ref: row.transaction_ref,
        }
    }
}

impl ActiveModel {
    /// Builds an insertable row from a record.
    ///
    /// A record without `created_at` leaves the column to its database default.
    #[must_use]
    pub fn from_record(record: &PaymentRecord) -> Self {
        Self {
            payment_id: Set(record.payment_id.clone()),
            created_at: record
                .created_at
                .map_or(NotSet, |at| Set(Some(at.fixed_offset()))),
            student_id: Set(Some(record.entity_id.clone())),
            student_name: Set(record.entity_name.clone()),
            department: Set(record.department.clone()),
            level: Set(record.level.clone()),
            payment_type: Set(record.payment_type.clone()),
            amount: Set(Some(record.amount)),
            status: Set(Some(record.raw_status.clone())),
            transaction_ref: Set(record.transaction_ref.clone()),
        }
    }
}
