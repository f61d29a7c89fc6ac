//! Presentation-facing handle to a running coordinator.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::error::ViewError;
use super::pipeline;
use super::types::{Projections, PublishedView, ViewEvent, ViewStatus};
use crate::reports::{EntityHistory, HistoryCache};
use crate::search::SearchFilter;

/// Cheap, cloneable access to the coordinator.
///
/// Reads go straight to the latest published view; commands travel through
/// the coordinator's event channel. Presentation never aggregates on its own.
#[derive(Clone)]
pub struct ViewHandle {
    events: mpsc::Sender<ViewEvent>,
    published: watch::Receiver<Arc<PublishedView>>,
    histories: HistoryCache,
}

impl ViewHandle {
    pub(crate) fn new(
        events: mpsc::Sender<ViewEvent>,
        published: watch::Receiver<Arc<PublishedView>>,
        histories: HistoryCache,
    ) -> Self {
        Self {
            events,
            published,
            histories,
        }
    }

    /// The latest published view.
    #[must_use]
    pub fn current(&self) -> Arc<PublishedView> {
        Arc::clone(&self.published.borrow())
    }

    /// The latest published projections.
    #[must_use]
    pub fn projections(&self) -> Arc<Projections> {
        Arc::clone(&self.published.borrow().projections)
    }

    /// The latest coordinator bookkeeping.
    #[must_use]
    pub fn status(&self) -> ViewStatus {
        self.published.borrow().status.clone()
    }

    /// A receiver that wakes on every publication.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<Arc<PublishedView>> {
        self.published.clone()
    }

    /// Drill-down for one student over the published ledger snapshot.
    #[must_use]
    pub fn history(&self, entity_id: &str) -> Arc<EntityHistory> {
        let view = self.current();
        self.histories
            .get_or_compute(view.status.generation, &view.ledger, entity_id)
    }

    /// Projections for a one-off query over the published ledger snapshot.
    ///
    /// Leaves the coordinator's active search untouched.
    #[must_use]
    pub fn project(&self, query: &str) -> Projections {
        (*project_published(&self.current(), query)).clone()
    }

    /// Status and projections taken from the same publication.
    ///
    /// Without a query the active search's projections are returned as-is.
    #[must_use]
    pub fn query(&self, query: Option<&str>) -> (ViewStatus, Arc<Projections>) {
        let view = self.current();
        let projections = match query {
            Some(query) => project_published(&view, query),
            None => Arc::clone(&view.projections),
        };
        (view.status.clone(), projections)
    }

    /// Asks the coordinator to re-fetch the ledger.
    pub async fn refresh(&self) -> Result<(), ViewError> {
        self.send(ViewEvent::Refresh).await
    }

    /// Replaces the coordinator's active search.
    pub async fn set_search(&self, query: impl Into<String>) -> Result<(), ViewError> {
        self.send(ViewEvent::SearchChanged(query.into())).await
    }

    /// Stops the coordinator.
    pub async fn shutdown(&self) -> Result<(), ViewError> {
        self.send(ViewEvent::Shutdown).await
    }

    /// Returns true while the coordinator accepts events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.events.is_closed()
    }

    async fn send(&self, event: ViewEvent) -> Result<(), ViewError> {
        self.events
            .send(event)
            .await
            .map_err(|_| ViewError::CoordinatorStopped)
    }
}

fn project_published(view: &PublishedView, query: &str) -> Arc<Projections> {
    let filter = SearchFilter::new(query);
    if filter == view.search {
        return Arc::clone(&view.projections);
    }
    Arc::new(pipeline::project(&view.ledger, &filter))
}
