//! Object Store Module
//!
//! Main cache engine combining HashMap lookup with LRU recency tracking,
//! guarded by a reader/writer lock and bounded by a byte budget.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Store Inner ==
/// State mutated under the lock: identity lookup, recency order, and the
/// running byte total. `total_bytes` always equals the sum of entry sizes,
/// and every key in `entries` appears exactly once in `lru`.
#[derive(Debug, Default)]
struct StoreInner {
    /// Canonical URI -> cached object
    entries: HashMap<String, CacheEntry>,
    /// Recency order over the same keys
    lru: LruTracker,
    /// Sum of sizes of all entries currently present
    total_bytes: usize,
}

// == Object Cache ==
/// Bounded, thread-safe store of proxied web objects.
///
/// Constructed once at startup and shared across connection workers.
/// Readers run concurrently; all structural mutation serializes on the
/// write half of the lock. No lock is ever held across network I/O.
#[derive(Debug)]
pub struct ObjectCache {
    inner: RwLock<StoreInner>,
    stats: CacheStats,
    max_total_bytes: usize,
    max_object_bytes: usize,
}

impl ObjectCache {
    // == Constructor ==
    /// Creates an empty cache with the given limits.
    ///
    /// # Arguments
    /// * `max_total_bytes` - budget for the sum of all cached object sizes
    /// * `max_object_bytes` - ceiling for any single object
    pub fn new(max_total_bytes: usize, max_object_bytes: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            stats: CacheStats::new(),
            max_total_bytes,
            max_object_bytes,
        }
    }

    // == Get ==
    /// Looks up `key` and returns an independent copy of the stored bytes.
    ///
    /// The lookup and copy run under a read lock so concurrent lookups never
    /// serialize on each other. Recency promotion happens afterwards under a
    /// brief write lock; if the entry was evicted between the two sections
    /// the promotion silently no-ops. The returned copy stays valid no
    /// matter what later mutations do to the cache.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let hit = {
            let inner = self.inner.read().await;
            inner.entries.get(key).map(|e| e.bytes().to_vec())
        };

        match hit {
            Some(bytes) => {
                self.stats.record_hit();
                let mut inner = self.inner.write().await;
                if inner.entries.contains_key(key) {
                    inner.lru.touch(key);
                }
                Some(bytes)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores `bytes` under `key`, replacing any existing entry.
    ///
    /// Silently refuses empty keys, empty objects, and objects over the
    /// per-object ceiling. Evicts least-recently-used entries until the new
    /// object fits the byte budget, then inserts it as most recently used.
    /// Replacement, eviction, and insertion are atomic with respect to
    /// other cache operations.
    pub async fn put(&self, key: &str, bytes: Vec<u8>) {
        let size = bytes.len();
        if key.is_empty() || size == 0 || size > self.max_object_bytes {
            return;
        }

        let mut inner = self.inner.write().await;

        // Replace semantics: at most one entry per key
        if let Some(old) = inner.entries.remove(key) {
            inner.total_bytes -= old.size();
            inner.lru.remove(key);
        }

        // Evict from the cold end until the new object fits
        while inner.total_bytes + size > self.max_total_bytes {
            let Some(victim) = inner.lru.evict_oldest() else {
                break;
            };
            if let Some(evicted) = inner.entries.remove(&victim) {
                inner.total_bytes -= evicted.size();
                self.stats.record_eviction();
                debug!(key = %victim, size = evicted.size(), "evicted cache entry");
            }
        }

        // Reachable only with a per-object ceiling above the total budget;
        // the budget invariant wins over the insert.
        if inner.total_bytes + size > self.max_total_bytes {
            return;
        }

        inner.total_bytes += size;
        inner.lru.touch(key);
        inner.entries.insert(key.to_string(), CacheEntry::new(bytes));
    }

    // == Accessors ==
    /// Current number of cached objects.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if the cache holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Sum of the sizes of all cached objects.
    pub async fn total_bytes(&self) -> usize {
        self.inner.read().await.total_bytes
    }

    /// The per-object size ceiling.
    pub fn max_object_bytes(&self) -> usize {
        self.max_object_bytes
    }

    /// Performance counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Consistency Check ==
    /// Asserts the structural invariants; test support.
    #[cfg(test)]
    pub(crate) async fn assert_consistent(&self) {
        let inner = self.inner.read().await;

        assert_eq!(inner.lru.len(), inner.entries.len());
        assert!(inner.total_bytes <= self.max_total_bytes);

        let mut summed = 0;
        for key in inner.lru.iter() {
            let entry = inner
                .entries
                .get(key)
                .unwrap_or_else(|| panic!("key '{}' tracked but not stored", key));
            assert!(entry.size() <= self.max_object_bytes);
            summed += entry.size();
        }
        assert_eq!(summed, inner.total_bytes);
    }
}
