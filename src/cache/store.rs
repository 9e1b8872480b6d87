//! Cache Store Module
//!
//! In-memory key-value store with lazy TTL expiry. The store is internally
//! synchronized: cloning a `TtlStore` yields another handle to the same
//! underlying map, safe to share across tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::sweep::pattern_matches;
use crate::cache::{CacheEntry, CacheStats, StatsCounters, DEFAULT_TTL};
use crate::config::CacheConfig;

// == Store Internals ==
#[derive(Debug)]
struct StoreInner<V> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Performance counters
    stats: StatsCounters,
    /// TTL applied when `set` is called without an explicit one
    default_ttl: Duration,
}

// == TTL Store ==
/// Shared in-memory store mapping string keys to values with an expiry.
///
/// Expiry is lazy: an expired entry stays in memory until a read finds it,
/// an explicit invalidation names it, or the optional cleanup task sweeps
/// it. For every read path, an expired entry is indistinguishable from an
/// absent one.
///
/// None of the operations can fail; the worst outcome of any call is a
/// miss, which callers resolve against the source of truth.
#[derive(Debug)]
pub struct TtlStore<V> {
    inner: Arc<StoreInner<V>>,
}

impl<V> Clone for TtlStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> Default for TtlStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> TtlStore<V> {
    // == Constructors ==
    /// Creates a new store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(HashMap::new()),
                stats: StatsCounters::default(),
                default_ttl,
            }),
        }
    }

    /// Creates a new store from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl)
    }

    // == Get ==
    /// Retrieves a clone of the value if present and not expired.
    ///
    /// An entry found expired is purged as a side effect and reported as a
    /// miss, exactly as if it had never been stored.
    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.inner.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => {
                    self.inner.stats.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired, purge under the write lock below
                None => {
                    self.inner.stats.record_miss();
                    return None;
                }
            }
        }

        let mut entries = self.inner.entries.write().await;
        // Re-check: another task may have overwritten the entry between locks.
        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                entries.remove(key);
                self.inner.stats.record_expiration();
            } else {
                self.inner.stats.record_hit();
                return Some(entry.value.clone());
            }
        }
        self.inner.stats.record_miss();
        None
    }

    // == Set ==
    /// Stores a value under `key`, unconditionally overwriting any prior
    /// entry and resetting its expiry to `now + ttl`.
    ///
    /// `ttl` falls back to the store's default when `None`.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.inner.default_ttl);
        let entry = CacheEntry::new(value, ttl);

        let mut entries = self.inner.entries.write().await;
        entries.insert(key.into(), entry);
    }

    // == Delete ==
    /// Removes the entry for `key` if present; a no-op otherwise.
    ///
    /// Returns whether an entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let mut entries = self.inner.entries.write().await;
        let removed = entries.remove(key).is_some();
        if removed {
            self.inner.stats.record_invalidations(1);
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Intended for test and reset paths.
    pub async fn clear(&self) {
        let mut entries = self.inner.entries.write().await;
        let count = entries.len() as u64;
        entries.clear();
        self.inner.stats.record_invalidations(count);
    }

    // == Exists ==
    /// Returns true if `key` holds an unexpired entry.
    ///
    /// Same miss-on-expiry semantics as [`get`](Self::get), without cloning
    /// the value. Does not count toward hit/miss statistics.
    pub async fn exists(&self, key: &str) -> bool {
        let entries = self.inner.entries.read().await;
        entries.get(key).is_some_and(|entry| !entry.is_expired())
    }

    // == Pattern Sweep ==
    /// Removes every live key matched by `pattern` and returns the count.
    ///
    /// An empty pattern removes nothing. Cost is proportional to the number
    /// of live keys, which is bounded by the process working set.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        if pattern.is_empty() {
            return 0;
        }

        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !pattern_matches(key, pattern));
        let removed = before - entries.len();

        if removed > 0 {
            self.inner.stats.record_invalidations(removed as u64);
            debug!(pattern, removed, "pattern sweep removed cache entries");
        }
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were purged.
    ///
    /// Reads never need this; it only bounds the memory held by entries
    /// that nothing reads again.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();

        self.inner.stats.record_expirations(removed as u64);
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the store's performance counters.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.inner.entries.read().await;
        self.inner.stats.snapshot(entries.len())
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }
}
