//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, lazy expirations and
//! explicit invalidations.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Internal atomic counters, updated without taking the store's write lock.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    invalidations: AtomicU64,
}

impl StatsCounters {
    /// Increments the hit counter.
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter.
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the expiration counter (entry purged lazily on read).
    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds `count` purged entries to the expiration counter.
    pub(crate) fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    /// Adds `count` removed entries to the invalidation counter.
    pub(crate) fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot with the given live entry count.
    pub(crate) fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Cache Stats ==
/// A point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries purged lazily after their TTL elapsed
    pub expirations: u64,
    /// Number of entries removed by delete, clear or pattern sweep
    pub invalidations: u64,
    /// Number of live entries at snapshot time
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = StatsCounters::default();
        let stats = counters.snapshot(0);

        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.invalidations, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();

        assert_eq!(counters.snapshot(3).hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_miss();

        assert_eq!(counters.snapshot(1).hit_rate(), 0.5);
    }

    #[test]
    fn test_record_invalidations_accumulates() {
        let counters = StatsCounters::default();
        counters.record_invalidations(2);
        counters.record_invalidations(3);

        assert_eq!(counters.snapshot(0).invalidations, 5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_expiration();

        let json = serde_json::to_value(counters.snapshot(7)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["expirations"], 1);
        assert_eq!(json["total_entries"], 7);
    }
}
