//! Core business logic for Feedesk.
//!
//! This crate contains the aggregation and view-consistency engine with ZERO
//! web or database dependencies.
//!
//! # Modules
//!
//! - `payments` - Payment records and their lenient decoding
//! - `ledger` - The authoritative in-memory snapshot of records
//! - `reports` - KPI totals, student rollups and drill-down histories
//! - `search` - Free-text filtering of records
//! - `storage` - The record store seam and an in-memory store
//! - `view` - The coordinator that keeps projections consistent

pub mod ledger;
pub mod payments;
pub mod reports;
pub mod search;
pub mod storage;
pub mod view;
