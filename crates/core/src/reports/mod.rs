//! Report aggregation.
//!
//! This module provides pure business logic for reducing payment records into:
//! - KPI totals
//! - Per-student rollups
//! - Per-student drill-down histories

pub mod cache;
pub mod service;
pub mod types;


pub use cache::HistoryCache;
pub use service::AggregationService;
pub use types::*;
