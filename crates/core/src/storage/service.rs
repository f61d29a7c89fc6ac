//! Record store trait and handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::error::FetchError;
use crate::payments::PaymentRecord;

/// Announcement that some payment row was created, updated or deleted.
///
/// Carries no patch semantics: every notice means "re-fetch everything".
/// The optional fields only feed logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// Operation reported by the store (INSERT, UPDATE, DELETE, ...).
    #[serde(default)]
    pub operation: Option<String>,
    /// Payment affected, when the store knows it.
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl ChangeNotice {
    /// A notice without details.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::default()
    }

    /// A notice for one operation on one payment.
    #[must_use]
    pub fn new(operation: impl Into<String>, payment_id: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            payment_id: Some(payment_id.into()),
        }
    }
}

/// Stream of change notices; closes when the subscription ends.
pub type ChangeFeed = mpsc::Receiver<ChangeNotice>;

/// Source of payment records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches every payment record, newest `created_at` first.
    async fn fetch_all(&self) -> Result<Vec<PaymentRecord>, FetchError>;

    /// Subscribes to change notices for the payments collection.
    async fn subscribe(&self) -> Result<ChangeFeed, FetchError>;
}

/// Explicitly constructed store handle passed to the coordinator.
#[derive(Clone, Default)]
pub enum StoreHandle {
    /// No store configured; every fetch fails with [`FetchError::NotInitialized`].
    #[default]
    Uninitialized,
    /// A store ready to serve requests.
    Ready(Arc<dyn RecordStore>),
}

impl StoreHandle {
    /// Wraps a store.
    #[must_use]
    pub fn new<S: RecordStore + 'static>(store: S) -> Self {
        Self::Ready(Arc::new(store))
    }

    /// Returns true if a store is configured.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Fetches every record from the store.
    pub async fn fetch_all(&self) -> Result<Vec<PaymentRecord>, FetchError> {
        match self {
            Self::Uninitialized => Err(FetchError::NotInitialized),
            Self::Ready(store) => store.fetch_all().await,
        }
    }

    /// Subscribes to change notices.
    pub async fn subscribe(&self) -> Result<ChangeFeed, FetchError> {
        match self {
            Self::Uninitialized => Err(FetchError::NotInitialized),
            Self::Ready(store) => store.subscribe().await,
        }
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "StoreHandle::Uninitialized"),
            Self::Ready(_) => write!(f, "StoreHandle::Ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uninitialized_handle_fails_fetch() {
        let handle = StoreHandle::default();
        assert!(!handle.is_ready());
        assert_eq!(handle.fetch_all().await, Err(FetchError::NotInitialized));
        assert!(matches!(
            handle.subscribe().await,
            Err(FetchError::NotInitialized)
        ));
    }

    #[test]
    fn test_change_notice_from_json_payload() {
        let notice: ChangeNotice =
            serde_json::from_str(r#"{"operation":"UPDATE","payment_id":"P7"}"#).unwrap();
        assert_eq!(notice, ChangeNotice::new("UPDATE", "P7"));

        let empty: ChangeNotice = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ChangeNotice::unspecified());
    }
}
