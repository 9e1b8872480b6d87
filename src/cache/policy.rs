//! Invalidation Policy Module
//!
//! The cache actions a write path applies after mutating the source of
//! truth. Each write type has a fixed rule: refresh or delete the exact
//! keys the record owns, then sweep the collection listing keys that cannot
//! be named exactly.
//!
//! Ordering contract: every method here must run AFTER the persistent write
//! has been confirmed. A reader racing a writer then sees either the old
//! cached value (until swept) or freshly loaded new data, never a cache
//! entry refreshed ahead of a persistent write that later failed.

use std::time::Duration;

use tracing::debug;

use crate::cache::{KeyNamespace, TtlStore};

// == Record Keys ==
/// The exact cache keys owned by one record: its canonical key plus every
/// secondary-lookup key derived from its unique fields.
///
/// For a delete, callers capture these BEFORE removing the record from the
/// persistent store, since the record itself is needed to know its
/// secondary keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    /// Canonical per-record key, e.g. `user:1`
    pub canonical: String,
    /// Secondary-lookup keys, e.g. `user:email:a@b.com`
    pub lookups: Vec<String>,
}

impl RecordKeys {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            lookups: Vec::new(),
        }
    }

    pub fn with_lookup(mut self, key: impl Into<String>) -> Self {
        self.lookups.push(key.into());
        self
    }
}

// == Invalidation Policy ==
/// Write-path cache discipline for one entity namespace.
///
/// Exact keys are written through (create/update) or deleted (delete);
/// listing keys are always swept wholesale, because any write can change
/// collection membership or ordering and correctness takes priority over
/// hit rate.
#[derive(Debug, Clone)]
pub struct InvalidationPolicy<V> {
    store: TtlStore<V>,
    listing_pattern: String,
    ttl: Option<Duration>,
}

impl<V: Clone> InvalidationPolicy<V> {
    // == Constructor ==
    /// Creates a policy over `store` sweeping `namespace`'s listing keys.
    pub fn new(store: TtlStore<V>, namespace: &KeyNamespace) -> Self {
        Self {
            store,
            listing_pattern: namespace.listing_pattern(),
            ttl: None,
        }
    }

    /// Overrides the TTL used for write-through entries (store default
    /// otherwise).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    // == Create ==
    /// Write-through for a freshly created record: populate its canonical
    /// and lookup keys, then sweep all listing keys. Returns the number of
    /// listing entries swept.
    pub async fn on_create(&self, keys: &RecordKeys, record: V) -> usize {
        self.store
            .set(&keys.canonical, record.clone(), self.ttl)
            .await;
        for key in &keys.lookups {
            self.store.set(key, record.clone(), self.ttl).await;
        }

        self.sweep_listings().await
    }

    // == Update ==
    /// Refresh for an updated record: overwrite the canonical and new
    /// lookup keys, delete lookup keys the old record had and the new one
    /// does not (a changed email must not leave the old email resolving to
    /// the record), then sweep all listing keys.
    pub async fn on_update(&self, old: &RecordKeys, new: &RecordKeys, record: V) -> usize {
        for stale in old.lookups.iter().filter(|key| !new.lookups.contains(key)) {
            self.store.delete(stale).await;
        }

        self.store
            .set(&new.canonical, record.clone(), self.ttl)
            .await;
        for key in &new.lookups {
            self.store.set(key, record.clone(), self.ttl).await;
        }

        self.sweep_listings().await
    }

    // == Delete ==
    /// Teardown for a removed record: delete its canonical and lookup keys,
    /// then sweep all listing keys.
    pub async fn on_delete(&self, keys: &RecordKeys) -> usize {
        self.store.delete(&keys.canonical).await;
        for key in &keys.lookups {
            self.store.delete(key).await;
        }

        self.sweep_listings().await
    }

    async fn sweep_listings(&self) -> usize {
        let swept = self.store.invalidate_pattern(&self.listing_pattern).await;
        debug!(pattern = %self.listing_pattern, swept, "listing keys swept after write");
        swept
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TtlStore<String>, KeyNamespace, InvalidationPolicy<String>) {
        let store: TtlStore<String> = TtlStore::new(Duration::from_secs(300));
        let ns = KeyNamespace::new("user", "users");
        let policy = InvalidationPolicy::new(store.clone(), &ns);
        (store, ns, policy)
    }

    fn alice_keys(ns: &KeyNamespace, email: &str) -> RecordKeys {
        RecordKeys::new(ns.record(1)).with_lookup(ns.lookup("email", email))
    }

    #[tokio::test]
    async fn test_create_writes_through_and_sweeps_listings() {
        let (store, ns, policy) = setup();

        store.set(ns.listing(), "stale listing".to_string(), None).await;
        store.set(ns.listing_page(2), "stale page".to_string(), None).await;

        let swept = policy
            .on_create(&alice_keys(&ns, "a@b.com"), "alice".to_string())
            .await;

        assert_eq!(swept, 2);
        assert_eq!(store.get(&ns.record(1)).await.as_deref(), Some("alice"));
        assert_eq!(
            store.get(&ns.lookup("email", "a@b.com")).await.as_deref(),
            Some("alice")
        );
        assert_eq!(store.get(&ns.listing()).await, None);
        assert_eq!(store.get(&ns.listing_page(2)).await, None);
    }

    #[tokio::test]
    async fn test_update_retires_stale_lookup_key() {
        let (store, ns, policy) = setup();

        policy
            .on_create(&alice_keys(&ns, "old@b.com"), "alice".to_string())
            .await;

        policy
            .on_update(
                &alice_keys(&ns, "old@b.com"),
                &alice_keys(&ns, "new@b.com"),
                "alice v2".to_string(),
            )
            .await;

        assert_eq!(store.get(&ns.record(1)).await.as_deref(), Some("alice v2"));
        assert_eq!(store.get(&ns.lookup("email", "old@b.com")).await, None);
        assert_eq!(
            store.get(&ns.lookup("email", "new@b.com")).await.as_deref(),
            Some("alice v2")
        );
    }

    #[tokio::test]
    async fn test_update_with_unchanged_lookup_keeps_it_fresh() {
        let (store, ns, policy) = setup();

        let keys = alice_keys(&ns, "a@b.com");
        policy.on_create(&keys, "alice".to_string()).await;
        policy.on_update(&keys, &keys, "alice v2".to_string()).await;

        assert_eq!(
            store.get(&ns.lookup("email", "a@b.com")).await.as_deref(),
            Some("alice v2")
        );
    }

    #[tokio::test]
    async fn test_update_sweeps_listings() {
        let (store, ns, policy) = setup();
        let keys = alice_keys(&ns, "a@b.com");

        policy.on_create(&keys, "alice".to_string()).await;
        store.set(ns.listing(), "stale listing".to_string(), None).await;

        let swept = policy.on_update(&keys, &keys, "alice v2".to_string()).await;

        assert_eq!(swept, 1);
        assert_eq!(store.get(&ns.listing()).await, None);
    }

    #[tokio::test]
    async fn test_delete_removes_every_record_key() {
        let (store, ns, policy) = setup();
        let keys = alice_keys(&ns, "a@b.com");

        policy.on_create(&keys, "alice".to_string()).await;
        store.set(ns.listing(), "stale listing".to_string(), None).await;

        let swept = policy.on_delete(&keys).await;

        assert_eq!(swept, 1);
        assert_eq!(store.get(&ns.record(1)).await, None);
        assert_eq!(store.get(&ns.lookup("email", "a@b.com")).await, None);
        assert_eq!(store.get(&ns.listing()).await, None);
    }

    #[tokio::test]
    async fn test_policy_leaves_other_namespaces_alone() {
        let (store, ns, policy) = setup();
        let tasks = KeyNamespace::new("task", "tasks");

        store.set(tasks.record(9), "a task".to_string(), None).await;
        store.set(tasks.listing(), "task listing".to_string(), None).await;

        policy
            .on_create(&alice_keys(&ns, "a@b.com"), "alice".to_string())
            .await;

        assert!(store.get(&tasks.record(9)).await.is_some());
        assert!(store.get(&tasks.listing()).await.is_some());
    }
}
