//! Cache-Aside Accessor Module
//!
//! Turns a [`TtlStore`] plus a fallback loader into a read-through cache:
//! check the cache first, load from the source of truth on a miss, populate
//! the cache with the loaded value.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::trace;

use crate::cache::TtlStore;
use crate::config::CacheConfig;

// == Cache Aside ==
/// Read-through accessor over a [`TtlStore`].
///
/// By default, concurrent misses on the same key are coalesced through a
/// per-key flight lock, so one cold key costs one loader invocation no
/// matter how many callers race on it. The original check-then-act behavior
/// (every racing caller may load) stays available behind
/// [`coalesce_loads`](CacheConfig::coalesce_loads) for compatibility with
/// callers that tolerate redundant loads.
#[derive(Debug)]
pub struct CacheAside<V> {
    store: TtlStore<V>,
    /// One lock per key with a load in flight
    flights: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    coalesce: bool,
}

impl<V> Clone for CacheAside<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            flights: Arc::clone(&self.flights),
            coalesce: self.coalesce,
        }
    }
}

impl<V: Clone> CacheAside<V> {
    // == Constructors ==
    /// Creates a coalescing accessor over `store`.
    pub fn new(store: TtlStore<V>) -> Self {
        Self {
            store,
            flights: Arc::new(Mutex::new(HashMap::new())),
            coalesce: true,
        }
    }

    /// Creates an accessor configured by a [`CacheConfig`].
    pub fn from_config(store: TtlStore<V>, config: &CacheConfig) -> Self {
        Self {
            coalesce: config.coalesce_loads,
            ..Self::new(store)
        }
    }

    /// The underlying store, for reads and invalidation outside the
    /// get-or-set path.
    pub fn store(&self) -> &TtlStore<V> {
        &self.store
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, loading and caching it on a miss.
    ///
    /// On a hit the loader is never invoked. On a miss the loader runs; its
    /// success is stored under `key` with `ttl` (store default when `None`)
    /// and returned. A loader failure is propagated unchanged and nothing is
    /// cached, so the next call retries the load.
    pub async fn get_or_set<F, Fut, E>(&self, key: &str, ttl: Option<Duration>, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !self.coalesce {
            return self.load_uncoalesced(key, ttl, loader).await;
        }

        let flight = {
            let mut flights = self.flights.lock().await;
            Arc::clone(flights.entry(key.to_string()).or_default())
        };

        let result = {
            let _guard = flight.lock().await;
            self.load_uncoalesced(key, ttl, loader).await
        };

        // Retire the flight lock once no other caller is waiting on it; the
        // map only holds keys with loads in progress.
        let mut flights = self.flights.lock().await;
        if let Some(entry) = flights.get(key) {
            if Arc::strong_count(entry) <= 2 {
                flights.remove(key);
            }
        }

        result
    }

    /// Plain check-then-act: check the store, load on miss, populate.
    ///
    /// Racing callers on the same cold key may each invoke their loader;
    /// whichever `set` lands last wins, and callers must not rely on a
    /// specific winner.
    async fn load_uncoalesced<F, Fut, E>(&self, key: &str, ttl: Option<Duration>, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.store.get(key).await {
            return Ok(value);
        }

        trace!(key, "cache miss, invoking loader");
        let value = loader().await?;
        self.store.set(key, value.clone(), ttl).await;
        Ok(value)
    }
}
