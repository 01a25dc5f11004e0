//! Cache Module
//!
//! Provides a namespaced in-memory cache with TTL expiry, get-or-fetch
//! lookups and key-pattern invalidation.

mod clock;
mod entry;
mod key;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{CacheKey, KeyPattern};
pub use stats::CacheStats;
pub use store::{FetchOptions, TtlCache};

// == TTL Tiers ==
/// How long a class of result stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlTier {
    /// Volatile reads: history, threads, search
    Short,
    /// Channel lists and profiles
    Medium,
    /// Full user directory
    Long,
}

impl TtlTier {
    /// The tier's time-to-live.
    pub const fn duration(self) -> Duration {
        match self {
            TtlTier::Short => Duration::from_secs(5 * 60),
            TtlTier::Medium => Duration::from_secs(15 * 60),
            TtlTier::Long => Duration::from_secs(60 * 60),
        }
    }
}

impl From<TtlTier> for FetchOptions {
    fn from(tier: TtlTier) -> Self {
        FetchOptions::ttl(tier.duration())
    }
}
