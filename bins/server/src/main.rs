//! Feedesk API Server
//!
//! Main entry point for the Feedesk payments dashboard service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedesk_api::{AppState, create_router};
use feedesk_core::storage::StoreHandle;
use feedesk_core::view::{ViewCoordinator, ViewHandle, ViewSettings};
use feedesk_db::{PostgresRecordStore, connect};
use feedesk_shared::{AppConfig, DatabaseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "feedesk=debug,feedesk_core=debug,feedesk_db=debug,feedesk_api=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect the record store, if configured
    let store = record_store(&config.database).await?;

    // Start the view coordinator
    let settings = ViewSettings {
        event_buffer: config.view.event_buffer,
        history_cache_capacity: config.view.history_cache_capacity,
        history_cache_ttl_secs: config.view.history_cache_ttl_secs,
    };
    let (view, coordinator) = ViewCoordinator::spawn(store, &settings);

    // Create router
    let app = create_router(AppState::new(view.clone(), &config.view.currency));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(currency = %config.view.currency, "Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(view))
        .await?;

    if let Err(e) = coordinator.await {
        error!(error = %e, "View coordinator task failed");
    }
    info!("Server stopped");

    Ok(())
}

/// Builds the store handle; without a database URL the view stays empty.
async fn record_store(database: &DatabaseConfig) -> anyhow::Result<StoreHandle> {
    let Some(url) = database.url.as_deref() else {
        warn!("No database URL configured (FEEDESK__DATABASE__URL); serving an empty dashboard");
        return Ok(StoreHandle::Uninitialized);
    };

    let db = connect(url, database.max_connections, database.min_connections)
        .await
        .context("Failed to connect to database")?;
    info!(channel = %database.notify_channel, "Connected to database");

    let store = PostgresRecordStore::new(db, url).with_channel(&database.notify_channel);
    Ok(StoreHandle::new(store))
}

/// Waits for Ctrl+C, then stops the coordinator.
async fn shutdown_signal(view: ViewHandle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    if let Err(e) = view.shutdown().await {
        warn!(error = %e, "View coordinator already stopped");
    }
}
