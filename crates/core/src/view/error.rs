//! View error types.

use thiserror::Error;

/// Errors raised by the presentation-facing view handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The coordinator task has stopped.
    #[error("view coordinator is not running")]
    CoordinatorStopped,
}
