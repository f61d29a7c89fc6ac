//! Refresh numbering.

/// Numbers refreshes and decides which responses may still be applied.
///
/// Every fetch gets a strictly increasing sequence number when it starts.
/// A response is applied only if its number is newer than the last applied
/// one, so an old response arriving late can never overwrite a newer ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSequencer {
    issued: u64,
    applied: u64,
}

impl RefreshSequencer {
    /// Creates a sequencer that has issued nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: 0,
            applied: 0,
        }
    }

    /// Issues the number for a new fetch.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Records that the response for `sequence` is being applied.
    ///
    /// Returns false, leaving state untouched, when the response is stale.
    pub fn accept(&mut self, sequence: u64) -> bool {
        if sequence <= self.applied || sequence > self.issued {
            return false;
        }
        self.applied = sequence;
        true
    }

    /// Most recently issued number.
    #[must_use]
    pub const fn last_issued(&self) -> u64 {
        self.issued
    }

    /// Most recently applied number.
    #[must_use]
    pub const fn last_applied(&self) -> u64 {
        self.applied
    }
}
