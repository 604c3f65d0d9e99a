//! Cache Store Module
//!
//! Bounded store combining HashMap storage with LRU tracking and TTL
//! expiration. Expiry and eviction are the only removal paths.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == TTL Store ==
/// Bounded key-to-entry storage with LRU eviction and TTL expiration.
///
/// The two policies are orthogonal and both apply: an entry can be evicted
/// by capacity pressure before it expires, or expire untouched.
#[derive(Debug)]
pub struct TtlStore<K, T> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<T>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_items: usize,
    /// Freshness window applied to every entry
    ttl: Duration,
}

impl<K, T> TtlStore<K, T>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new TtlStore with the given capacity and freshness window.
    pub fn new(max_items: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_items,
            ttl,
        }
    }

    // == Get ==
    /// Retrieves the entry for a key, if present and fresh.
    ///
    /// An expired entry is removed and reported as absent. A successful
    /// read counts as a use for recency ordering.
    pub fn get(&mut self, key: &K) -> Option<&CacheEntry<T>> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(self.ttl),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            let len = self.entries.len();
            self.stats.set_total_entries(len);
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key)
    }

    // == Put ==
    /// Records a value with the current timestamp as its entry.
    ///
    /// If the key already exists, its entry is replaced and its recency
    /// refreshed. If inserting a new key at capacity, the least recently
    /// used key is evicted first; the evicted key is returned.
    pub fn put(&mut self, key: K, value: T) -> Option<K> {
        let is_overwrite = self.entries.contains_key(&key);

        let mut evicted = None;
        if !is_overwrite && self.entries.len() >= self.max_items {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_eviction();
                evicted = Some(oldest);
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);

        let len = self.entries.len();
        self.stats.set_total_entries(len);

        evicted
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed. The lazy removal in `get`
    /// already keeps reads correct; this eager sweep frees capacity held
    /// by entries that are never touched again.
    pub fn purge_expired(&mut self) -> usize {
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.lru.remove(&key);
            self.stats.record_expiration();
        }

        let len = self.entries.len();
        self.stats.set_total_entries(len);
        count
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of physical entries, expired included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
