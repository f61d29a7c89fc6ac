//! Postgres-backed record store.
//!
//! Fetches go through the payment repository. Change notices come from a
//! dedicated `LISTEN` connection fed by the `notify_payments_changed` trigger.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use feedesk_core::payments::PaymentRecord;
use feedesk_core::storage::{ChangeFeed, ChangeNotice, FetchError, RecordStore};
use sea_orm::{DatabaseConnection, DbErr};
use sqlx::postgres::{PgListener, PgNotification};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::migration::PAYMENTS_CHANNEL;
use crate::repositories::PaymentRepository;

/// Buffered change notices per subscription.
const NOTICE_BUFFER: usize = 64;

/// Pause after a listener error before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Record store reading the `payments` table.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    payments: PaymentRepository,
    database_url: String,
    channel: String,
}

impl PostgresRecordStore {
    /// Creates a store over an open connection.
    ///
    /// `database_url` is used again for the notification listener, which
    /// needs a connection of its own.
    #[must_use]
    pub fn new(db: DatabaseConnection, database_url: impl Into<String>) -> Self {
        Self {
            payments: PaymentRepository::new(db),
            database_url: database_url.into(),
            channel: PAYMENTS_CHANNEL.to_string(),
        }
    }

    /// Listens on a different notification channel.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn fetch_all(&self) -> Result<Vec<PaymentRecord>, FetchError> {
        let rows = self
            .payments
            .list_newest_first()
            .await
            .map_err(fetch_error)?;
        debug!(rows = rows.len(), "Fetched payments");
        Ok(rows.into_iter().map(PaymentRecord::from).collect())
    }

    async fn subscribe(&self) -> Result<ChangeFeed, FetchError> {
        let mut listener = PgListener::connect(&self.database_url)
            .await
            .map_err(|e| FetchError::unavailable(e.to_string()))?;
        listener
            .listen(&self.channel)
            .await
            .map_err(|e| FetchError::unavailable(e.to_string()))?;
        info!(channel = %self.channel, "Listening for payment changes");

        let (tx, rx) = mpsc::channel(NOTICE_BUFFER);
        tokio::spawn(forward_notifications(listener, tx));
        Ok(rx)
    }
}

/// Relays notifications until the subscriber goes away.
///
/// A dropped connection is re-established by the listener on the next
/// receive. Notifications sent while it was down are lost, so a bare notice
/// is sent to force a full re-fetch.
async fn forward_notifications(mut listener: PgListener, tx: mpsc::Sender<ChangeNotice>) {
    loop {
        let received = tokio::select! {
            () = tx.closed() => break,
            received = listener.try_recv() => received,
        };

        let notice = notice_for(
            received
                .as_ref()
                .map(|notification| notification.as_ref().map(PgNotification::payload)),
        );
        if received.is_err() {
            tokio::time::sleep(RETRY_DELAY).await;
        }

        if tx.send(notice).await.is_err() {
            break;
        }
    }
    debug!("Payment notification relay stopped");
}

/// The notice to relay for one listener receive.
///
/// `Ok(None)` means the connection dropped and `Err` means the receive
/// failed. Either way changes may have been missed, so both yield a bare
/// notice.
pub(crate) fn notice_for<E: Display>(received: Result<Option<&str>, E>) -> ChangeNotice {
    match received {
        Ok(Some(payload)) => parse_notice(payload),
        Ok(None) => {
            warn!("Notification connection lost; reconnecting");
            ChangeNotice::unspecified()
        }
        Err(e) => {
            warn!(error = %e, "Failed to receive payment notification");
            ChangeNotice::unspecified()
        }
    }
}

/// Decodes a trigger payload; anything unreadable still counts as a change.
pub(crate) fn parse_notice(payload: &str) -> ChangeNotice {
    serde_json::from_str(payload).unwrap_or_else(|e| {
        debug!(error = %e, payload, "Unrecognised notification payload");
        ChangeNotice::unspecified()
    })
}

/// Maps a database error onto the record store's error kinds.
pub(crate) fn fetch_error(err: DbErr) -> FetchError {
    match &err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => FetchError::Unavailable(err.to_string()),
        DbErr::Type(_) | DbErr::Json(_) | DbErr::TryIntoErr { .. } => {
            FetchError::Decode(err.to_string())
        }
        _ => FetchError::Rejected(err.to_string()),
    }
}
