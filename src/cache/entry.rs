//! Cache Entry Module
//!
//! Defines the record kept for each cached value.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A stored value together with the time it was written and its TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was written
    pub stored_at: DateTime<Utc>,
    /// How long the value stays valid after `stored_at`
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    pub fn new(value: V, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: now,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is past its TTL at `now`.
    ///
    /// An entry is expired once strictly more than `ttl` has elapsed since it
    /// was stored. At exactly `ttl` it is still served.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now) > self.ttl
    }

    // == Time To Live ==
    /// Returns the time left before expiry, saturating at zero.
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.ttl.saturating_sub(self.age_at(now))
    }

    /// Elapsed time since the entry was stored. A clock that moved backwards
    /// yields zero.
    fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }
}
