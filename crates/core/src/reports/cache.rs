//! Drill-down history caching using Moka.
//!
//! Histories are requested one student at a time, usually repeatedly while a
//! dashboard is open. Entries are keyed by ledger generation, so a new
//! snapshot never serves a history computed from an older one.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::service::AggregationService;
use super::types::EntityHistory;
use crate::payments::PaymentRecord;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache for student drill-down histories.
///
/// Thread-safe; clones share the same underlying cache.
#[derive(Clone)]
pub struct HistoryCache {
    cache: Cache<(u64, String), Arc<EntityHistory>>,
}

impl HistoryCache {
    /// Creates a new history cache with default settings.
    ///
    /// Default: 256 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a new history cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Returns the history for `entity_id` in ledger `generation`, computing
    /// it from `records` on a miss.
    ///
    /// `records` must be the snapshot belonging to `generation`.
    pub fn get_or_compute(
        &self,
        generation: u64,
        records: &[PaymentRecord],
        entity_id: &str,
    ) -> Arc<EntityHistory> {
        let key = (generation, entity_id.to_string());
        self.cache.get_with(key, || {
            Arc::new(AggregationService::compute_entity_history(
                records, entity_id,
            ))
        })
    }

    /// Drops every entry computed from a generation older than `generation`.
    pub fn retain_generation(&self, generation: u64) {
        for (key, _) in &self.cache {
            if key.0 < generation {
                self.cache.invalidate(key.as_ref());
            }
        }
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}
