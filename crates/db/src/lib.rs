//! Postgres record store for Feedesk.
//!
//! This crate provides:
//! - The `SeaORM` entity for the payments table
//! - A repository for payment rows
//! - Migrations, including the change-notification trigger
//! - `PostgresRecordStore`, the `RecordStore` implementation over Postgres

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod store;

pub use repositories::PaymentRepository;
pub use store::PostgresRecordStore;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
