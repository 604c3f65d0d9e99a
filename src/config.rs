//! Configuration Module
//!
//! Per-instance tuning for the memoization engine, immutable after a
//! `Memoizer` is constructed from it.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Memoization engine configuration.
///
/// All values can also be loaded from environment variables with sensible
/// defaults, or deserialized from an embedding application's config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoConfig {
    /// Freshness window: entries older than this are treated as absent
    pub ttl: Duration,
    /// Maximum number of cached entries; the least recently used entry is
    /// evicted when a new key is inserted at capacity
    pub max_items: usize,
    /// Lookahead window for background refresh. When the remaining
    /// freshness of a hit drops below this, a refresh is started without
    /// blocking the caller. `None` (or zero) disables prefetching.
    pub prefetch: Option<Duration>,
}

impl MemoConfig {
    /// Creates a new MemoConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_TTL_SECS` - Freshness window in seconds (default: 60)
    /// - `MEMO_MAX_ITEMS` - Maximum cached entries (default: 100)
    /// - `MEMO_PREFETCH_SECS` - Refresh lookahead in seconds (default: unset)
    pub fn from_env() -> Self {
        Self {
            ttl: env::var("MEMO_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(60)),
            max_items: env::var("MEMO_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            prefetch: env::var("MEMO_PREFETCH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        }
    }

    /// Checks the configuration invariants: a positive ttl and a capacity
    /// of at least one entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        if self.max_items == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_items: 100,
            prefetch: None,
        }
    }
}
