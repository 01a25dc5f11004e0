//! Cache Store Module
//!
//! Namespaced TTL cache with get-or-fetch semantics.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheKey, CacheStats, Clock, KeyPattern, SystemClock};

// == Fetch Options ==
/// Per-call options for [`TtlCache::get_or_fetch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// TTL for a freshly fetched value. Falls back to the cache default.
    pub ttl: Option<Duration>,
    /// Skip the stored value and call the producer. The result is still
    /// written back.
    pub bypass_cache: bool,
}

impl FetchOptions {
    /// Options with an explicit TTL.
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            bypass_cache: false,
        }
    }

    /// Sets the bypass flag.
    pub fn bypass(mut self, bypass_cache: bool) -> Self {
        self.bypass_cache = bypass_cache;
        self
    }
}

// == TTL Cache ==
/// In-memory cache scoped to one namespace.
///
/// The cache is owned by a single caller and is not shared between
/// processes. Entries expire lazily: an expired entry is dropped the next
/// time it is looked up, or by [`TtlCache::purge_expired`].
#[derive(Debug)]
pub struct TtlCache<V = serde_json::Value> {
    namespace: String,
    entries: HashMap<CacheKey, CacheEntry<V>>,
    stats: CacheStats,
    default_ttl: Duration,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache for `namespace` using the system clock.
    ///
    /// # Arguments
    /// * `namespace` - Name of this cache's key space
    /// * `default_ttl` - TTL used when a fetch does not specify one
    pub fn new(namespace: impl Into<String>, default_ttl: Duration) -> Self {
        Self::with_clock(namespace, default_ttl, Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by the given clock.
    pub fn with_clock(
        namespace: impl Into<String>,
        default_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            enabled: true,
            clock,
        }
    }

    /// The namespace this cache was created with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or calls `producer` and caches
    /// its result.
    ///
    /// A producer error is returned as-is and nothing is written. While the
    /// cache is disabled the producer is always called and its result is
    /// not stored. With `bypass_cache` the stored value is ignored but the
    /// fresh result replaces it.
    ///
    /// # Arguments
    /// * `key` - Canonical key for the value
    /// * `producer` - Called on a miss to obtain a fresh value
    /// * `options` - TTL override and bypass flag
    pub async fn get_or_fetch<F, Fut, E>(
        &mut self,
        key: &CacheKey,
        producer: F,
        options: FetchOptions,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !self.enabled {
            self.stats.record_miss();
            debug!(namespace = %self.namespace, %key, "cache disabled, fetching");
            return producer().await;
        }

        if !options.bypass_cache {
            if let Some(value) = self.lookup(key) {
                self.stats.record_hit();
                debug!(namespace = %self.namespace, %key, "cache hit");
                return Ok(value);
            }
        }

        self.stats.record_miss();
        debug!(namespace = %self.namespace, %key, bypass = options.bypass_cache, "cache miss, fetching");

        let value = producer().await?;

        let ttl = options.ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value.clone(), self.clock.now(), ttl);
        self.entries.insert(key.clone(), entry);
        self.stats.record_set();

        Ok(value)
    }

    /// Returns a live value, dropping the entry if it has expired.
    fn lookup(&mut self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let expired = self.entries.get(key)?.is_expired_at(now);
        if expired {
            self.entries.remove(key);
            debug!(namespace = %self.namespace, %key, "evicted expired entry");
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Enable / Disable ==
    /// Forces every lookup to call its producer. Stored entries are kept.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Resumes normal lookups.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Whether lookups may be answered from the store.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zeroes every counter.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::new();
    }

    // == Invalidation ==
    /// Removes every entry. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        debug!(namespace = %self.namespace, count, "cache cleared");
        count
    }

    /// Removes the entry for `key`. Returns whether one was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.record_invalidations(1);
            debug!(namespace = %self.namespace, %key, "invalidated");
        }
        removed
    }

    /// Removes every entry whose key matches `pattern`. Returns the number
    /// removed.
    pub fn invalidate_pattern(&mut self, pattern: &KeyPattern) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !pattern.matches(key));
        let count = before - self.entries.len();
        self.stats.record_invalidations(count);
        debug!(namespace = %self.namespace, %pattern, count, "invalidated by pattern");
        count
    }

    // == Purge Expired ==
    /// Drops all entries past their TTL. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a live entry exists for `key`. Does not touch the counters.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }
}
