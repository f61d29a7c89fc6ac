//! View coordination.
//!
//! The coordinator owns the ledger and keeps every published projection
//! consistent with it:
//! - `pipeline` - pure filter + aggregation over one snapshot
//! - `sequence` - refresh numbering and stale-response detection
//! - `coordinator` - the event loop serializing refreshes
//! - `handle` - the presentation-facing side of the coordinator

pub mod coordinator;
pub mod error;
pub mod handle;
pub mod pipeline;
pub mod sequence;
pub mod types;

#[cfg(test)]
mod tests;

pub use coordinator::{ViewCoordinator, ViewSettings};
pub use error::ViewError;
pub use handle::ViewHandle;
pub use pipeline::project;
pub use sequence::RefreshSequencer;
pub use types::*;
