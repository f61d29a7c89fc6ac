//! Payment records.
//!
//! This module provides the record type every derived view is computed from:
//! - `PaymentRecord` with lenient deserialization
//! - Status and category classification

mod lenient;
pub mod types;


pub use types::*;
