//! Cache Module
//!
//! In-process TTL caching: the key-value store with lazy expiry, the key
//! namespace builders, the cache-aside accessor and the write-path
//! invalidation rules.

mod aside;
mod entry;
mod keys;
mod policy;
mod stats;
mod store;
mod sweep;


// Re-export public types
pub use aside::CacheAside;
pub use entry::CacheEntry;
pub use keys::KeyNamespace;
pub use policy::{InvalidationPolicy, RecordKeys};
pub use stats::CacheStats;
pub use store::TtlStore;
pub use sweep::pattern_matches;

pub(crate) use stats::StatsCounters;

// == Public Constants ==
/// TTL applied when neither the config nor the call site provides one
pub const DEFAULT_TTL: std::time::Duration = std::time::Duration::from_secs(3600);
