//! Record store error types.

use thiserror::Error;

/// Failure to fetch from, or subscribe to, the record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No store has been configured.
    #[error("record store is not initialized")]
    NotInitialized,

    /// The store could not be reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the request.
    #[error("record store rejected the request: {0}")]
    Rejected(String),

    /// The store answered with something that is not a record set.
    #[error("record store response could not be decoded: {0}")]
    Decode(String),
}

impl FetchError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create a rejected error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::NotInitialized.to_string(),
            "record store is not initialized"
        );
        assert_eq!(
            FetchError::unavailable("connection refused").to_string(),
            "record store unavailable: connection refused"
        );
        assert_eq!(
            FetchError::rejected("permission denied").to_string(),
            "record store rejected the request: permission denied"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(FetchError::unavailable("timeout").is_transient());
        assert!(!FetchError::rejected("denied").is_transient());
        assert!(!FetchError::NotInitialized.is_transient());
        assert!(!FetchError::Decode("bad json".into()).is_transient());
    }
}
