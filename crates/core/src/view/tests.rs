//! Coordinator behaviour tests against the in-memory record store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::payments::PaymentRecord;
use crate::storage::{ChangeFeed, FetchError, MemoryRecordStore, RecordStore, StoreHandle};

fn example_records() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord::new("P1", "E1", "Tuition Fee", dec!(500), "Paid").with_entity_name("Ama"),
        PaymentRecord::new("P2", "E1", "Hostel", dec!(100), "Paid").with_entity_name("Ama"),
        PaymentRecord::new("P3", "E2", "Tuition", dec!(300), "Pending").with_entity_name("Kofi"),
    ]
}

fn spawn(store: &MemoryRecordStore) -> (ViewHandle, tokio::task::JoinHandle<()>) {
    ViewCoordinator::spawn(StoreHandle::new(store.clone()), &ViewSettings::default())
}

async fn wait_for(
    handle: &ViewHandle,
    mut predicate: impl FnMut(&PublishedView) -> bool,
) -> Arc<PublishedView> {
    let mut changes = handle.changes();
    let view = tokio::time::timeout(
        Duration::from_secs(5),
        changes.wait_for(|view| predicate(view)),
    )
    .await
    .expect("timed out waiting for publication")
    .expect("coordinator dropped its publisher");
    Arc::clone(&view)
}

async fn wait_for_generation(handle: &ViewHandle, generation: u64) -> Arc<PublishedView> {
    wait_for(handle, |view| {
        view.status.generation >= generation && view.status.state == ViewState::Idle
    })
    .await
}

/// Store whose first fetch panics; later fetches read the inner store.
struct PanicOnceStore {
    inner: MemoryRecordStore,
    panicked: AtomicBool,
}

#[async_trait]
impl RecordStore for PanicOnceStore {
    async fn fetch_all(&self) -> Result<Vec<PaymentRecord>, FetchError> {
        assert!(
            self.panicked.swap(true, Ordering::SeqCst),
            "driver blew up mid-fetch"
        );
        self.inner.fetch_all().await
    }

    async fn subscribe(&self) -> Result<ChangeFeed, FetchError> {
        self.inner.subscribe().await
    }
}

async fn let_coordinator_drain() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_initial_load_publishes_projections() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);

    let view = wait_for_generation(&handle, 1).await;

    let kpis = view.projections.kpis;
    assert_eq!(kpis.total, dec!(600));
    assert_eq!(kpis.tuition_total, dec!(500));
    assert_eq!(kpis.other_total, dec!(100));
    assert_eq!(kpis.paid_count, 2);
    assert_eq!(view.projections.payments_shown(), 3);
    assert!(view.projections.rollups.get("E2").is_none());
    assert!(view.status.store_ready);
    assert!(view.status.last_error.is_none());
}

#[tokio::test]
async fn test_change_notice_triggers_full_refresh() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    wait_for_generation(&handle, 1).await;

    store.insert(PaymentRecord::new("P4", "E2", "Tuition", dec!(300), "paid"));

    let view = wait_for(&handle, |view| view.projections.kpis.paid_count == 3).await;
    assert_eq!(view.projections.kpis.total, dec!(900));
    assert_eq!(view.ledger[0].payment_id, "P4");
    assert_eq!(
        view.projections.rollups.get("E2").map(|r| r.tuition_sum),
        Some(dec!(300))
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_good_view() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    let good = wait_for_generation(&handle, 1).await;

    store.fail_next_fetch(FetchError::unavailable("connection refused"));
    handle.refresh().await.unwrap();

    let view = wait_for(&handle, |view| view.status.last_error.is_some()).await;
    assert_eq!(view.status.generation, 1);
    assert_eq!(*view.projections, *good.projections);
    assert_eq!(
        view.status.last_error.as_deref(),
        Some("record store unavailable: connection refused")
    );

    handle.refresh().await.unwrap();
    let recovered = wait_for(&handle, |view| {
        view.status.generation == 2 && view.status.last_error.is_none()
    })
    .await;
    assert_eq!(recovered.projections.kpis.total, dec!(600));
}

#[tokio::test]
async fn test_panicking_fetch_is_reported_as_failure() {
    let store = PanicOnceStore {
        inner: MemoryRecordStore::new(example_records()),
        panicked: AtomicBool::new(false),
    };
    let (handle, _task) =
        ViewCoordinator::spawn(StoreHandle::new(store), &ViewSettings::default());

    let failed = wait_for(&handle, |view| {
        view.status.last_error.is_some() && view.status.state == ViewState::Idle
    })
    .await;
    assert_eq!(failed.status.generation, 0);
    assert!(
        failed
            .status
            .last_error
            .as_deref()
            .is_some_and(|e| e.starts_with("record store unavailable: fetch task failed"))
    );

    handle.refresh().await.unwrap();
    let recovered = wait_for_generation(&handle, 1).await;
    assert!(recovered.status.last_error.is_none());
    assert_eq!(recovered.projections.kpis.total, dec!(600));
}

#[tokio::test]
async fn test_refreshes_never_overlap() {
    let store = MemoryRecordStore::gated(example_records());
    let (handle, _task) = spawn(&store);

    for _ in 0..3 {
        handle.refresh().await.unwrap();
    }
    let_coordinator_drain().await;
    assert!(store.fetch_count() <= 1);

    // The queued follow-up starts as soon as the first fetch lands.
    store.release(1);
    wait_for(&handle, |view| view.status.generation >= 1).await;
    store.release(1);
    wait_for_generation(&handle, 2).await;
    let_coordinator_drain().await;

    assert_eq!(store.fetch_count(), 2);
    assert_eq!(handle.status().state, ViewState::Idle);
}

#[tokio::test]
async fn test_change_during_refresh_is_not_lost() {
    let store = MemoryRecordStore::gated(example_records());
    let (handle, _task) = spawn(&store);
    let_coordinator_drain().await;

    store.insert(PaymentRecord::new("P9", "E3", "Library", dec!(25), "paid"));
    store.release(2);

    let view = wait_for(&handle, |view| {
        view.ledger.iter().any(|r| r.payment_id == "P9") && view.status.state == ViewState::Idle
    })
    .await;
    assert_eq!(view.projections.kpis.other_total, dec!(125));
    assert!(view.projections.rollups.contains("E3"));
}

#[tokio::test]
async fn test_search_narrows_payments_and_students_together() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    wait_for_generation(&handle, 1).await;

    handle.set_search("HOSTEL").await.unwrap();
    let view = wait_for(&handle, |view| view.search.query() == "hostel").await;

    assert_eq!(view.projections.payments_shown(), 1);
    let ama = view.projections.rollups.get("E1").unwrap();
    assert_eq!(ama.tuition_sum, Decimal::ZERO);
    assert_eq!(ama.other_sum, dec!(100));
    assert_eq!(view.projections.kpis.total, dec!(600));

    handle.set_search("").await.unwrap();
    let cleared = wait_for(&handle, |view| view.search.is_empty()).await;
    assert_eq!(cleared.projections.payments_shown(), 3);
    assert_eq!(*cleared.projections, handle.project(""));
}

#[tokio::test]
async fn test_one_off_projection_leaves_active_search() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    wait_for_generation(&handle, 1).await;

    let kofi = handle.project("kofi");

    assert_eq!(kofi.payments_shown(), 1);
    assert!(kofi.rollups.is_empty());
    assert!(handle.current().search.is_empty());
    assert_eq!(handle.projections().payments_shown(), 3);
}

#[tokio::test]
async fn test_history_matches_rollup() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    let view = wait_for_generation(&handle, 1).await;

    let e1 = handle.history("E1");
    assert_eq!(e1.total, view.projections.rollups.get("E1").unwrap().total());
    assert_eq!(e1.display_name(), "Ama");

    let e2 = handle.history("E2");
    assert_eq!(e2.records.len(), 1);
    assert_eq!(e2.total, Decimal::ZERO);

    let unknown = handle.history("E404");
    assert!(unknown.is_unknown());
    assert_eq!(unknown.display_name(), "E404");
}

#[tokio::test]
async fn test_history_follows_new_snapshot() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    wait_for_generation(&handle, 1).await;
    assert_eq!(handle.history("E2").total, Decimal::ZERO);

    store.insert(PaymentRecord::new("P4", "E2", "Tuition", dec!(300), "paid"));
    wait_for_generation(&handle, 2).await;

    assert_eq!(handle.history("E2").total, dec!(300));
}

#[tokio::test]
async fn test_refresh_is_idempotent_on_unchanged_store() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, _task) = spawn(&store);
    let first = wait_for_generation(&handle, 1).await;

    handle.refresh().await.unwrap();
    let second = wait_for_generation(&handle, 2).await;

    assert_eq!(*first.projections, *second.projections);
}

#[tokio::test]
async fn test_uninitialized_store_serves_empty_view() {
    let (handle, _task) =
        ViewCoordinator::spawn(StoreHandle::Uninitialized, &ViewSettings::default());

    let view = wait_for(&handle, |view| view.status.last_error.is_some()).await;

    assert!(!view.status.store_ready);
    assert_eq!(view.status.generation, 0);
    assert_eq!(view.status.state, ViewState::Idle);
    assert!(view.projections.payments.is_empty());
    assert_eq!(view.projections.kpis, crate::reports::KpiTotals::default());
}

#[tokio::test]
async fn test_shutdown_stops_coordinator() {
    let store = MemoryRecordStore::new(example_records());
    let (handle, task) = spawn(&store);
    wait_for_generation(&handle, 1).await;

    handle.shutdown().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("coordinator did not stop")
        .unwrap();

    assert!(!handle.is_running());
    assert_eq!(handle.refresh().await, Err(ViewError::CoordinatorStopped));
}
