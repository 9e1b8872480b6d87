//! Pattern Sweep Module
//!
//! Key matching for bulk invalidation. Collection-level cache keys share a
//! namespace prefix (`users:list`, `users:list:p2`, ...) so a single sweep
//! can retire the whole family after a write changes collection membership.

// == Pattern Matching ==
/// Returns true if `key` is matched by `pattern`.
///
/// Rules:
/// - an empty pattern matches nothing, so a sweep with an empty pattern can
///   never clear the whole store by accident;
/// - a pattern ending in `*` matches keys starting with the part before the
///   `*` (a bare `*` still matches nothing);
/// - any other pattern matches keys that contain it as a substring.
pub fn pattern_matches(key: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    match pattern.strip_suffix('*') {
        Some(prefix) => !prefix.is_empty() && key.starts_with(prefix),
        None => key.contains(pattern),
    }
}
