//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Reporting view configuration.
    #[serde(default)]
    pub view: ViewConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
///
/// The URL is optional: without it the record store stays uninitialized and
/// the dashboard serves an empty view.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Postgres channel carrying payment change notifications.
    #[serde(default = "default_notify_channel")]
    pub notify_channel: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            notify_channel: default_notify_channel(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_notify_channel() -> String {
    "payments_changed".to_string()
}

/// Reporting view configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    /// ISO 4217 code attached to every amount the API returns.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Capacity of the coordinator's event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Maximum number of cached drill-down histories.
    #[serde(default = "default_history_cache_capacity")]
    pub history_cache_capacity: u64,
    /// Time-to-live for cached drill-down histories.
    #[serde(default = "default_history_cache_ttl")]
    pub history_cache_ttl_secs: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            event_buffer: default_event_buffer(),
            history_cache_capacity: default_history_cache_capacity(),
            history_cache_ttl_secs: default_history_cache_ttl(),
        }
    }
}

fn default_currency() -> String {
    "GHS".to_string()
}

fn default_event_buffer() -> usize {
    64
}

fn default_history_cache_capacity() -> u64 {
    256
}

fn default_history_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FEEDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
