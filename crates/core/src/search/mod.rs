//! Free-text search over payment records.

pub mod filter;

pub use filter::SearchFilter;
