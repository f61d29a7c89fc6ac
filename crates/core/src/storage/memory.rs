//! In-memory record store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Semaphore, mpsc};

use super::error::FetchError;
use super::service::{ChangeFeed, ChangeNotice, RecordStore};
use crate::payments::PaymentRecord;

/// Capacity of each subscriber's notice channel.
const FEED_CAPACITY: usize = 32;

#[derive(Default)]
struct Inner {
    records: Vec<PaymentRecord>,
    subscribers: Vec<mpsc::Sender<ChangeNotice>>,
    failures: Vec<FetchError>,
}

/// Record store held in process memory.
///
/// Records are kept newest first: inserts go to the front. Every mutation
/// notifies all live subscribers. Fetches can be gated so a caller decides
/// when each one completes.
#[derive(Clone)]
pub struct MemoryRecordStore {
    inner: Arc<Mutex<Inner>>,
    gate: Option<Arc<Semaphore>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryRecordStore {
    /// Creates a store holding `records` in the given order.
    #[must_use]
    pub fn new(records: Vec<PaymentRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records,
                ..Inner::default()
            })),
            gate: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a store whose fetches wait for [`MemoryRecordStore::release`].
    #[must_use]
    pub fn gated(records: Vec<PaymentRecord>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(records)
        }
    }

    /// Lets `count` waiting or future fetches complete.
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Makes the next fetch fail with `error`. Queued failures apply in order.
    pub fn fail_next_fetch(&self, error: FetchError) {
        self.lock().failures.push(error);
    }

    /// Replaces every record and notifies subscribers.
    pub fn replace(&self, records: Vec<PaymentRecord>) {
        let mut inner = self.lock();
        inner.records = records;
        notify(&mut inner, ChangeNotice::unspecified());
    }

    /// Adds a record as the newest one and notifies subscribers.
    pub fn insert(&self, record: PaymentRecord) {
        let mut inner = self.lock();
        let notice = ChangeNotice::new("INSERT", record.payment_id.clone());
        inner.records.insert(0, record);
        notify(&mut inner, notice);
    }

    /// Removes a record by id and notifies subscribers. Returns whether it existed.
    pub fn remove(&self, payment_id: &str) -> bool {
        let mut inner = self.lock();
        let before = inner.records.len();
        inner.records.retain(|r| r.payment_id != payment_id);
        let removed = inner.records.len() != before;
        if removed {
            notify(&mut inner, ChangeNotice::new("DELETE", payment_id));
        }
        removed
    }

    /// Current records, newest first.
    #[must_use]
    pub fn records(&self) -> Vec<PaymentRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn notify(inner: &mut Inner, notice: ChangeNotice) {
    inner
        .subscribers
        .retain(|tx| match tx.try_send(notice.clone()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_all(&self) -> Result<Vec<PaymentRecord>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        // Snapshot before waiting so a gated fetch returns what existed when it started.
        let outcome = {
            let mut inner = self.lock();
            if inner.failures.is_empty() {
                Ok(inner.records.clone())
            } else {
                Err(inner.failures.remove(0))
            }
        };

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| FetchError::unavailable(e.to_string()))?
                .forget();
        }

        outcome
    }

    async fn subscribe(&self) -> Result<ChangeFeed, FetchError> {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        self.lock().subscribers.push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(id: &str) -> PaymentRecord {
        PaymentRecord::new(id, "S-1", "Tuition", dec!(100), "paid")
    }

    #[tokio::test]
    async fn test_fetch_returns_records_in_order() {
        let store = MemoryRecordStore::new(vec![record("P2"), record("P1")]);
        let fetched = store.fetch_all().await.unwrap();
        assert_eq!(fetched[0].payment_id, "P2");
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_goes_first_and_notifies() {
        let store = MemoryRecordStore::new(vec![record("P1")]);
        let mut feed = store.subscribe().await.unwrap();

        store.insert(record("P2"));

        assert_eq!(feed.recv().await, Some(ChangeNotice::new("INSERT", "P2")));
        assert_eq!(store.records()[0].payment_id, "P2");
    }

    #[tokio::test]
    async fn test_remove_notifies_only_when_present() {
        let store = MemoryRecordStore::new(vec![record("P1")]);
        let mut feed = store.subscribe().await.unwrap();

        assert!(!store.remove("P9"));
        assert!(store.remove("P1"));

        assert_eq!(feed.recv().await, Some(ChangeNotice::new("DELETE", "P1")));
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_queued_failures_apply_in_order() {
        let store = MemoryRecordStore::new(vec![record("P1")]);
        store.fail_next_fetch(FetchError::unavailable("down"));

        assert_eq!(
            store.fetch_all().await,
            Err(FetchError::unavailable("down"))
        );
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_gated_fetch_waits_for_release() {
        let store = MemoryRecordStore::gated(vec![record("P1")]);
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_all().await }
        });

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        store.release(1);
        assert_eq!(pending.await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let store = MemoryRecordStore::default();
        drop(store.subscribe().await.unwrap());

        store.replace(vec![record("P1")]);

        assert!(store.lock().subscribers.is_empty());
    }
}
