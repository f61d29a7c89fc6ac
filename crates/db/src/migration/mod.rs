//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_payments;
mod m20261019_000002_change_notify;

/// Channel the change-notification trigger publishes on.
pub const PAYMENTS_CHANNEL: &str = "payments_changed";

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_payments::Migration),
            Box::new(m20261019_000002_change_notify::Migration),
        ]
    }
}
