//! Record store seam.
//!
//! The record store supplies the full set of payment records on demand and
//! announces that something changed. Its transport is not the engine's
//! concern:
//! - `RecordStore` is the trait adapters implement
//! - `StoreHandle` gives the store an explicit initialized/uninitialized lifecycle
//! - `MemoryRecordStore` backs tests and demos
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  fetch_all()   ┌─────────────┐  replace_all()  ┌────────┐
//! │ RecordStore  │ ─────────────► │ Coordinator │ ──────────────► │ Ledger │
//! │              │ ─────────────► │             │                 └────────┘
//! └──────────────┘  ChangeNotice  └─────────────┘
//! ```

mod error;
mod memory;
mod service;

pub use error::FetchError;
pub use memory::MemoryRecordStore;
pub use service::{ChangeFeed, ChangeNotice, RecordStore, StoreHandle};
