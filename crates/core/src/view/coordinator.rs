//! The view coordinator event loop.
//!
//! One task owns the ledger. It consumes presentation events, change notices
//! from the record store and fetch completions, and republishes projections
//! after every change. Fetches run on spawned tasks; aggregation runs inline
//! on the coordinator task and never suspends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::handle::ViewHandle;
use super::pipeline;
use super::sequence::RefreshSequencer;
use super::types::{PublishedView, ViewEvent, ViewState, ViewStatus};
use crate::ledger::Ledger;
use crate::payments::PaymentRecord;
use crate::reports::HistoryCache;
use crate::search::SearchFilter;
use crate::storage::{ChangeFeed, ChangeNotice, FetchError, StoreHandle};

/// Default capacity of the event channel.
const DEFAULT_EVENT_BUFFER: usize = 64;

/// Coordinator tuning.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    /// Capacity of the presentation event channel.
    pub event_buffer: usize,
    /// Maximum number of cached drill-down histories.
    pub history_cache_capacity: u64,
    /// Time-to-live for cached drill-down histories.
    pub history_cache_ttl_secs: u64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            event_buffer: DEFAULT_EVENT_BUFFER,
            history_cache_capacity: 256,
            history_cache_ttl_secs: 300,
        }
    }
}

/// Result of one fetch, reported back to the event loop.
#[derive(Debug)]
pub(crate) struct FetchCompleted {
    pub(crate) sequence: u64,
    pub(crate) result: Result<Vec<PaymentRecord>, FetchError>,
}

/// Owns the ledger and keeps published projections consistent with it.
pub struct ViewCoordinator {
    store: StoreHandle,
    events: mpsc::Receiver<ViewEvent>,
    core: CoordinatorCore,
}

impl ViewCoordinator {
    /// Creates a coordinator and the handle presentation talks to.
    ///
    /// Nothing happens until [`ViewCoordinator::run`] is awaited.
    #[must_use]
    pub fn new(store: StoreHandle, settings: &ViewSettings) -> (Self, ViewHandle) {
        let (event_tx, event_rx) = mpsc::channel(settings.event_buffer.max(1));
        let (publisher, published) =
            watch::channel(Arc::new(PublishedView::initial(store.is_ready())));
        let histories = HistoryCache::with_config(
            settings.history_cache_capacity,
            settings.history_cache_ttl_secs,
        );

        let core = CoordinatorCore::new(store.is_ready(), publisher, histories.clone());
        let handle = ViewHandle::new(event_tx, published, histories);

        (
            Self {
                store,
                events: event_rx,
                core,
            },
            handle,
        )
    }

    /// Creates a coordinator and runs it on a new task.
    #[must_use]
    pub fn spawn(store: StoreHandle, settings: &ViewSettings) -> (ViewHandle, JoinHandle<()>) {
        let (coordinator, handle) = Self::new(store, settings);
        (handle, tokio::spawn(coordinator.run()))
    }

    /// Runs the event loop until shutdown or until every handle is dropped.
    ///
    /// Subscribes to store changes and performs the initial load first.
    pub async fn run(self) {
        let Self {
            store,
            mut events,
            mut core,
        } = self;
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let mut feed = match store.subscribe().await {
            Ok(feed) => {
                info!("Subscribed to payment changes");
                Some(feed)
            }
            Err(FetchError::NotInitialized) => {
                warn!("Record store not initialized; serving an empty view");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to subscribe to payment changes");
                None
            }
        };

        start_refresh(&mut core, &store, &done_tx);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(ViewEvent::Refresh) => start_refresh(&mut core, &store, &done_tx),
                    Some(ViewEvent::SearchChanged(query)) => core.set_search(&query),
                    Some(ViewEvent::Shutdown) | None => break,
                },
                Some(done) = done_rx.recv() => {
                    if core.complete_fetch(done) {
                        start_refresh(&mut core, &store, &done_tx);
                    }
                }
                notice = next_notice(&mut feed) => match notice {
                    Some(notice) => {
                        debug!(
                            operation = ?notice.operation,
                            payment_id = ?notice.payment_id,
                            "Payment change received"
                        );
                        start_refresh(&mut core, &store, &done_tx);
                    }
                    None => {
                        warn!("Payment change feed closed; only manual refreshes will update the view");
                        feed = None;
                    }
                },
            }
        }

        info!("View coordinator stopped");
    }
}

fn start_refresh(
    core: &mut CoordinatorCore,
    store: &StoreHandle,
    done_tx: &mpsc::UnboundedSender<FetchCompleted>,
) {
    let Some(sequence) = core.begin_refresh() else {
        return;
    };
    let store = store.clone();
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = match tokio::spawn(async move { store.fetch_all().await }).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, sequence, "Fetch task failed");
                Err(FetchError::unavailable(format!("fetch task failed: {e}")))
            }
        };
        // The receiver only closes once the coordinator has stopped.
        let _ = done_tx.send(FetchCompleted { sequence, result });
    });
}

async fn next_notice(feed: &mut Option<ChangeFeed>) -> Option<ChangeNotice> {
    match feed {
        Some(feed) => feed.recv().await,
        None => std::future::pending().await,
    }
}

/// Coordinator state, free of any I/O.
pub(crate) struct CoordinatorCore {
    ledger: Ledger,
    filter: SearchFilter,
    state: ViewState,
    sequencer: RefreshSequencer,
    refresh_queued: bool,
    last_error: Option<String>,
    refreshed_at: Option<DateTime<Utc>>,
    store_ready: bool,
    publisher: watch::Sender<Arc<PublishedView>>,
    histories: HistoryCache,
}

impl CoordinatorCore {
    pub(crate) fn new(
        store_ready: bool,
        publisher: watch::Sender<Arc<PublishedView>>,
        histories: HistoryCache,
    ) -> Self {
        Self {
            ledger: Ledger::new(),
            filter: SearchFilter::default(),
            state: ViewState::Idle,
            sequencer: RefreshSequencer::new(),
            refresh_queued: false,
            last_error: None,
            refreshed_at: None,
            store_ready,
            publisher,
            histories,
        }
    }

    /// Starts a refresh, or queues one if a fetch is already outstanding.
    ///
    /// Returns the sequence number of the fetch to launch, if any. Any number
    /// of requests made while refreshing collapse into one follow-up fetch.
    pub(crate) fn begin_refresh(&mut self) -> Option<u64> {
        if self.state == ViewState::Refreshing {
            debug!(
                in_flight = self.sequencer.last_issued(),
                "Refresh already in flight; queued"
            );
            self.refresh_queued = true;
            return None;
        }

        let sequence = self.sequencer.begin();
        self.state = ViewState::Refreshing;
        debug!(sequence, "Refresh started");
        self.publish_status();
        Some(sequence)
    }

    /// Applies a fetch result.
    ///
    /// Returns true if a queued refresh should start now.
    pub(crate) fn complete_fetch(&mut self, done: FetchCompleted) -> bool {
        let FetchCompleted { sequence, result } = done;
        if sequence == self.sequencer.last_issued() {
            self.state = ViewState::Idle;
        }

        match result {
            Ok(records) if self.sequencer.accept(sequence) => {
                let count = records.len();
                let generation = self.ledger.replace_all(records);
                self.refreshed_at = Some(Utc::now());
                self.last_error = None;
                self.histories.retain_generation(generation);
                info!(sequence, generation, records = count, "Ledger refreshed");
                self.publish();
            }
            Ok(_) => {
                debug!(
                    sequence,
                    applied = self.sequencer.last_applied(),
                    "Discarding stale fetch response"
                );
                self.publish_status();
            }
            Err(FetchError::NotInitialized) => {
                warn!(sequence, "Refresh skipped: record store not initialized");
                self.last_error = Some(FetchError::NotInitialized.to_string());
                self.publish_status();
            }
            Err(e) => {
                error!(error = %e, sequence, "Failed to fetch payments; keeping previous view");
                self.last_error = Some(e.to_string());
                self.publish_status();
            }
        }

        std::mem::take(&mut self.refresh_queued) && self.state == ViewState::Idle
    }

    /// Replaces the search and republishes projections.
    pub(crate) fn set_search(&mut self, query: &str) {
        self.filter = SearchFilter::new(query);
        debug!(query = self.filter.query(), "Search changed");
        self.publish();
    }

    fn status(&self) -> ViewStatus {
        ViewStatus {
            state: self.state,
            generation: self.ledger.generation(),
            refreshed_at: self.refreshed_at,
            last_error: self.last_error.clone(),
            store_ready: self.store_ready,
        }
    }

    /// Recomputes projections from the ledger and publishes them.
    fn publish(&self) {
        let ledger = self.ledger.snapshot();
        let projections = Arc::new(pipeline::project(&ledger, &self.filter));
        self.publisher.send_replace(Arc::new(PublishedView {
            status: self.status(),
            projections,
            ledger,
            search: self.filter.clone(),
        }));
    }

    /// Publishes new bookkeeping alongside the previous projections.
    fn publish_status(&self) {
        let previous = Arc::clone(&self.publisher.borrow());
        self.publisher.send_replace(Arc::new(PublishedView {
            status: self.status(),
            projections: Arc::clone(&previous.projections),
            ledger: Arc::clone(&previous.ledger),
            search: previous.search.clone(),
        }));
    }
}
