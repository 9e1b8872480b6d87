//! Cacheside - an in-process TTL cache with cache-aside discipline
//!
//! Provides the caching core a repository layer wraps around its persistent
//! store: a TTL key-value store with lazy expiry, canonical key builders,
//! a get-or-set accessor that coalesces concurrent loads, and the
//! invalidation rules write paths apply after the persistent store confirms
//! a mutation.

pub mod cache;
pub mod config;
pub mod tasks;

pub use cache::{
    pattern_matches, CacheAside, CacheEntry, CacheStats, InvalidationPolicy, KeyNamespace,
    RecordKeys, TtlStore, DEFAULT_TTL,
};
pub use config::CacheConfig;
pub use tasks::spawn_cleanup_task;
