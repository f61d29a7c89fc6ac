//! Payments table.
//!
//! Every column except the key is nullable; rows are written by external
//! systems and the reporting engine tolerates missing values.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(PAYMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS payments CASCADE;")
            .await?;
        Ok(())
    }
}

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    payment_id TEXT PRIMARY KEY,
    created_at TIMESTAMPTZ DEFAULT now(),
    student_id TEXT,
    student_name TEXT,
    department TEXT,
    level TEXT,
    payment_type TEXT,
    amount NUMERIC(14, 2),
    status TEXT,
    transaction_ref TEXT
);

-- Full fetch is always newest first
CREATE INDEX idx_payments_created_at ON payments(created_at DESC);

-- Drill-down by student
CREATE INDEX idx_payments_student ON payments(student_id);
";
