//! Change notifications for the payments table.
//!
//! Every insert, update, delete and truncate publishes a small JSON payload
//! on the `payments_changed` channel. Listeners treat any notification as a
//! signal to re-fetch the whole table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(NOTIFY_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TRIGGER IF EXISTS trg_payments_truncated ON payments;
DROP TRIGGER IF EXISTS trg_payments_changed ON payments;
DROP FUNCTION IF EXISTS notify_payments_changed();
",
        )
        .await?;
        Ok(())
    }
}

const NOTIFY_SQL: &str = r"
CREATE OR REPLACE FUNCTION notify_payments_changed()
RETURNS TRIGGER AS $$
DECLARE
    affected TEXT;
BEGIN
    IF TG_LEVEL = 'STATEMENT' THEN
        PERFORM pg_notify('payments_changed', json_build_object('operation', TG_OP)::text);
        RETURN NULL;
    END IF;

    IF TG_OP = 'DELETE' THEN
        affected := OLD.payment_id;
    ELSE
        affected := NEW.payment_id;
    END IF;

    PERFORM pg_notify(
        'payments_changed',
        json_build_object('operation', TG_OP, 'payment_id', affected)::text
    );
    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_payments_changed
    AFTER INSERT OR UPDATE OR DELETE ON payments
    FOR EACH ROW EXECUTE FUNCTION notify_payments_changed();

CREATE TRIGGER trg_payments_truncated
    AFTER TRUNCATE ON payments
    FOR EACH STATEMENT EXECUTE FUNCTION notify_payments_changed();
";
