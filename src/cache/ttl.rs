//! In-memory memoization cache with a fixed time-to-live
//!
//! Provides a `TtlCache` that holds loaded API payloads keyed by request
//! identity. Entries older than the TTL are treated as absent and are replaced
//! wholesale by the next successful load.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Identity of a season-scoped collection request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    /// Resource path below the season, e.g. `results` or `constructors/ferrari/sprint`
    pub resource: String,
    /// Season year
    pub year: u16,
    /// Page size the collection was loaded with
    pub page_size: u32,
}

impl CacheKey {
    pub fn new(resource: impl Into<String>, year: u16, page_size: u32) -> Self {
        Self {
            resource: resource.into(),
            year,
            page_size,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.resource, self.year, self.page_size)
    }
}

/// Wrapper for a cached value
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached data
    data: V,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// Fresh while `now - cached_at <= ttl`
    fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (now - self.cached_at).to_std() {
            Ok(age) => age <= ttl,
            // cached_at lies in the future (clock moved back): still fresh
            Err(_) => true,
        }
    }
}

/// Process-wide memoization cache with a fixed TTL
///
/// Reads hand out clones, so a cached payload can never be mutated through a
/// returned value. There is no size bound: the key space (resource × season)
/// is small. Two concurrent misses for one key may both load; the last write
/// wins.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a copy of the entry for `key` if it is still fresh
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_fresh(self.ttl, Utc::now()) {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// Stores `data` under `key`, replacing any previous entry and timestamp
    pub fn insert(&self, key: K, data: V) {
        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Returns the fresh entry for `key`, or runs `load` and caches its result
    ///
    /// A failed load leaves the cache untouched and returns the error. The
    /// lock is released while `load` runs. A successful load also drops any
    /// other entries that have expired.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(key = ?key, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(key = ?key, "cache miss");
        let data = load().await?;
        let purged = self.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, "dropped expired cache entries");
        }
        self.insert(key, data.clone());
        Ok(data)
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(self.ttl, now));
        before - entries.len()
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
