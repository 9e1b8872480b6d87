//! Configuration Module
//!
//! Cache configuration, loadable from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for entries stored without an explicit one
    pub default_ttl: Duration,
    /// Coalesce concurrent loads of the same cold key into one flight
    pub coalesce_loads: bool,
    /// Background expiry-sweep interval in seconds, 0 disables the task
    /// (expiry is then purely lazy, checked at read time)
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment
    /// variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 3600)
    /// - `CACHE_COALESCE_LOADS` - Coalesce concurrent loads (default: true)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Sweep interval in seconds,
    ///   0 disables (default: 0)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
            coalesce_loads: env::var("CACHE_COALESCE_LOADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            coalesce_loads: true,
            cleanup_interval: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
        assert!(config.coalesce_loads);
        assert_eq!(config.cleanup_interval, 0);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DEFAULT_TTL_SECS");
        env::remove_var("CACHE_COALESCE_LOADS");
        env::remove_var("CACHE_CLEANUP_INTERVAL_SECS");

        let config = CacheConfig::from_env();
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
        assert!(config.coalesce_loads);
        assert_eq!(config.cleanup_interval, 0);
    }
}
