//! The ledger: the authoritative snapshot of payment records.
//!
//! The ledger is replaced wholesale on every load or refresh and never
//! mutated record by record. Readers hold an [`LedgerSnapshot`] and keep
//! seeing exactly the records they were handed, whatever happens to the
//! ledger afterwards.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::payments::PaymentRecord;

/// Read-only view of one ledger generation, newest record first.
pub type LedgerSnapshot = Arc<[PaymentRecord]>;

/// Current set of payment records.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: LedgerSnapshot,
    generation: u64,
}

impl Ledger {
    /// Creates an empty ledger at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    /// Replaces every record at once.
    ///
    /// Order is kept as supplied; the record store is responsible for
    /// newest-first ordering. Returns the new generation number.
    pub fn replace_all(&mut self, records: Vec<PaymentRecord>) -> u64 {
        let duplicates = count_duplicate_ids(&records);
        if duplicates > 0 {
            warn!(
                duplicates,
                generation = self.generation + 1,
                "Ledger snapshot contains duplicate payment ids"
            );
        }

        self.records = Arc::from(records);
        self.generation += 1;
        self.generation
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        Arc::clone(&self.records)
    }

    /// Number of snapshots applied so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of records in the current snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the current snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn count_duplicate_ids(records: &[PaymentRecord]) -> usize {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| !seen.insert(record.payment_id.as_str()))
        .count()
}
