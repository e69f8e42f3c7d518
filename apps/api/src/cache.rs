//! In-memory TTL cache used to memoize comparison results.
//!
//! Bounded by time only, never by size. Expired entries are removed lazily
//! when `get` touches them, or eagerly via `purge_expired`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

/// A single cached value and its absolute expiry.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

/// Point-in-time view of the cache for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Raw entry count, including expired entries not yet purged.
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub default_ttl_secs: u64,
}

/// Key → value store with per-entry expiry.
///
/// All operations take the same lock; it is never held across an `.await`.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Mutex<CacheInner<V>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            default_ttl,
        }
    }

    pub fn with_ttl_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes * 60))
    }

    /// Stores `value` under `key` with the default TTL, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key` expiring `ttl` from now, replacing any existing entry.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock().entries.insert(key.into(), entry);
    }

    /// Returns a clone of the value if present and not expired.
    /// An expired entry is removed before returning `None`.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();

        let expired = inner.entries.get(key).map(|e| e.is_expired(now));
        match expired {
            Some(false) => {
                inner.hits += 1;
                inner.entries.get(key).map(|e| e.value.clone())
            }
            Some(true) => {
                debug!(key = %short_key(key), "Cache entry expired, removing");
                inner.entries.remove(key);
                inner.misses += 1;
                None
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Number of stored entries. This is a raw count: entries that have
    /// expired but were not yet touched by `get` are still counted.
    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| !e.is_expired(now));
        before - inner.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            default_ttl_secs: self.default_ttl.as_secs(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<V>> {
        // A panic while holding the lock cannot leave the map half-written,
        // so a poisoned guard is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn short_key(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
