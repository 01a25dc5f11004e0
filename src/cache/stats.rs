//! Cache Statistics Module
//!
//! Tracks lookup and write counters for one cache instance.

use serde::Serialize;

// == Cache Stats ==
/// Counters for a single cache. Only ever grow until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a stored entry
    pub hits: u64,
    /// Lookups that had to call the producer
    pub misses: u64,
    /// Values written to the store
    pub sets: u64,
    /// Entries removed by `invalidate` or `invalidate_pattern`
    pub invalidations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_set(&mut self) {
        self.sets += 1;
    }

    pub(crate) fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }
}
