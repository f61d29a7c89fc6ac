//! Payment repository for database operations.

use feedesk_core::payments::PaymentRecord;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder,
};

use crate::entities::payments;

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads every payment, newest `created_at` first.
    ///
    /// Rows without a timestamp sort first, as Postgres orders NULLs in
    /// descending scans. Ties break on the payment id for a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_newest_first(&self) -> Result<Vec<payments::Model>, DbErr> {
        payments::Entity::find()
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_asc(payments::Column::PaymentId)
            .all(&self.db)
            .await
    }

    /// Finds a payment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, payment_id: &str) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find_by_id(payment_id.to_string())
            .one(&self.db)
            .await
    }

    /// Inserts one payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including on a duplicate id.
    pub async fn insert(&self, record: &PaymentRecord) -> Result<payments::Model, DbErr> {
        payments::ActiveModel::from_record(record)
            .insert(&self.db)
            .await
    }

    /// Deletes a payment, returning whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(&self, payment_id: &str) -> Result<bool, DbErr> {
        let result = payments::Entity::delete_by_id(payment_id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Counts stored payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        payments::Entity::find().count(&self.db).await
    }
}
