//! Shared errors and configuration for Feedesk.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, ServerConfig, ViewConfig};
pub use error::{AppError, AppResult};
