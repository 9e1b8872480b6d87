//! Key Namespace Module
//!
//! Pure, deterministic builders for cache key strings. Keys follow the
//! `<entity>:<qualifier>` convention: `user:1` for a record, `user:email:a@b`
//! for a secondary lookup, `users:list` / `users:list:p2` for collection
//! listings. Prefixing every key with the entity or collection name is what
//! keeps two namespaces from ever colliding.

use std::fmt::Display;

// == Key Namespace ==
/// Canonical key builders for one entity type.
///
/// `entity` names a single record (`user`), `collection` names listings over
/// all records (`users`). Builders are pure; equal inputs always produce
/// equal keys.
#[derive(Debug, Clone)]
pub struct KeyNamespace {
    entity: String,
    collection: String,
}

impl KeyNamespace {
    // == Constructor ==
    pub fn new(entity: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            collection: collection.into(),
        }
    }

    // == Record Key ==
    /// Canonical key for a single record: `user:1`.
    pub fn record(&self, id: impl Display) -> String {
        format!("{}:{}", self.entity, id)
    }

    // == Lookup Key ==
    /// Secondary-lookup key for a unique field: `user:email:a@b.com`.
    pub fn lookup(&self, field: &str, value: impl Display) -> String {
        format!("{}:{}:{}", self.entity, field, value)
    }

    // == Listing Keys ==
    /// Key for the unpaginated collection listing: `users:list`.
    pub fn listing(&self) -> String {
        format!("{}:list", self.collection)
    }

    /// Key for one page of the collection listing: `users:list:p2`.
    pub fn listing_page(&self, page: usize) -> String {
        format!("{}:list:p{}", self.collection, page)
    }

    /// Pattern matching every listing key of this collection, for sweeps.
    pub fn listing_pattern(&self) -> String {
        format!("{}:list", self.collection)
    }
}
