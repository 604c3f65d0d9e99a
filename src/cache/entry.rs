//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A memoized value together with the instant it was computed.
///
/// Entries are only ever created from a successful computation and are
/// immutable afterwards; a newer entry for the same key replaces them.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Completion instant of the computation that produced the value
    pub created_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Is Expired ==
    /// Checks if the entry has outlived the given freshness window.
    ///
    /// Boundary condition: an entry is expired when its age is greater
    /// than or equal to the ttl, so that once the window has fully
    /// elapsed the entry is immediately treated as absent.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    // == Remaining ==
    /// Freshness left before the entry expires, saturating at zero.
    ///
    /// This drives the prefetch decision: a hit whose remaining freshness
    /// is below the configured lookahead gets a background refresh.
    pub fn remaining(&self, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.age())
    }
}
