//! Thread-safe LRU cache with per-entry TTL.
//!
//! Uses `IndexMap` internally so recency order falls out of insertion
//! order (front = LRU, back = MRU) without a hand-rolled linked list. A
//! single `parking_lot::RwLock` guards the map, recency order, and entry
//! timestamps as one consistent unit; hit/miss/eviction counters are
//! separate atomics so observers can read them without contending on the
//! map lock.

#![allow(clippy::cast_precision_loss)]

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Default time-to-live applied when `set` is called without an explicit
/// TTL. The cache never stores entries with unbounded lifetime, which
/// keeps the sweeper's job well defined.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of `get` calls that found a live entry.
    pub hits: u64,
    /// Number of `get` calls that found nothing, or found an expired entry.
    pub misses: u64,
    /// Number of entries evicted to stay within capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`; `0.0` when no reads have happened yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry<V> {
    value: V,
    expire_at: Instant,
    last_access: Instant,
}

impl<V> Entry<V> {
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expire_at <= now
    }
}

/// Thread-safe, capacity-bounded LRU cache with TTL expiry.
pub struct LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    capacity: usize,
    inner: RwLock<IndexMap<K, Entry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty cache with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero: a zero-capacity cache can never hold
    /// an entry and every `set` would evict it immediately, which is never
    /// the caller's intent.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be non-zero");
        Self {
            capacity,
            inner: RwLock::new(IndexMap::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries, including any not yet swept past
    /// expiry.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.read().len()
    }

    /// Inserts or overwrites `key`, evicting the least-recently-used
    /// entry if the post-insert size would exceed capacity. `ttl`
    /// defaults to [`DEFAULT_TTL`] when `None`.
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        let now = Instant::now();
        let entry = Entry {
            value,
            expire_at: now + ttl.unwrap_or(DEFAULT_TTL),
            last_access: now,
        };

        let mut inner = self.inner.write();
        // Re-insertion moves the key to the back (MRU) regardless of prior
        // position; shift_remove preserves the order of everyone else.
        inner.shift_remove(&key);

        if inner.len() >= self.capacity {
            if inner.shift_remove_index(0).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        inner.insert(key, entry);
    }

    /// Returns the value for `key` if present and not expired, refreshing
    /// its recency. Expired entries are removed eagerly on access.
    ///
    /// Takes the exclusive lock for the whole operation — lookup, recency
    /// update, and eviction bookkeeping happen as a single atomic step, so
    /// `last_access` can never be observed torn from the entry it belongs
    /// to (see the synchronization note in the crate root).
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.write();

        let Some(index) = inner.get_index_of(key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let expired = inner
            .get_index(index)
            .is_some_and(|(_, entry)| entry.is_expired_at(now));
        if expired {
            inner.shift_remove_index(index);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let (k, mut entry) = inner.shift_remove_index(index).expect("index just checked");
        entry.last_access = now;
        let value = entry.value.clone();
        inner.insert(k, entry);

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(value)
    }

    /// Removes `key` if present. Idempotent.
    pub fn del(&self, key: &K) {
        let mut inner = self.inner.write();
        inner.shift_remove(key);
    }

    /// Predicate form of `get`: reports presence without cloning the
    /// value or updating recency.
    #[must_use]
    pub fn exists(&self, key: &K) -> bool {
        let inner = self.inner.read();
        match inner.get(key) {
            Some(entry) => !entry.is_expired_at(Instant::now()),
            None => false,
        }
    }

    /// Atomically inserts `key` only if it is absent (or expired);
    /// returns whether the insert happened.
    pub fn set_if_not_exists(&self, key: K, value: V, ttl: Option<Duration>) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.write();

        if let Some(entry) = inner.get(&key) {
            if !entry.is_expired_at(now) {
                return false;
            }
        }

        inner.shift_remove(&key);
        if inner.len() >= self.capacity {
            if inner.shift_remove_index(0).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        inner.insert(
            key,
            Entry {
                value,
                expire_at: now + ttl.unwrap_or(DEFAULT_TTL),
                last_access: now,
            },
        );
        true
    }

    /// Scans all entries and removes those whose `expire_at <= now`.
    /// Called by the background sweeper; holds the exclusive lock for the
    /// whole scan, per the concurrency design.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let before = inner.len();
        inner.retain(|_, entry| !entry.is_expired_at(now));
        before - inner.len()
    }

    /// Recency-ordered snapshot of keys (LRU first, MRU last).
    #[must_use]
    pub fn get_all_keys(&self) -> Vec<K> {
        self.inner.read().keys().cloned().collect()
    }

    /// Read-only dump of every live (non-expired) key/value pair, paired
    /// with its remaining time-to-live, for the background sweeper to hand
    /// to [`crate::snapshot::Snapshot::snapshot`]. Unlike [`Self::get`],
    /// this never updates recency or hit/miss counters — a periodic
    /// snapshot should not perturb the LRU order it is merely observing.
    #[must_use]
    pub fn snapshot_entries(&self) -> Vec<(K, V, Duration)> {
        let now = Instant::now();
        self.inner
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(k, entry)| (k.clone(), entry.value.clone(), entry.expire_at.saturating_duration_since(now)))
            .collect()
    }

    /// Empties the cache. Does not reset hit/miss/eviction counters; use
    /// [`Self::reset_stats`] for that.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Zeroes the hit/miss/eviction counters.
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    /// Current hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Hit rate in `[0, 1]`.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
