//! Outcome cache.
//!
//! Two independent expiring maps keyed by resolution key:
//! - positive: the URL a scan resolved to
//! - negative: the fact that a scan found nothing
//!
//! The engine only talks to [`OutcomeStore`], so the in-process
//! [`MemoryCache`] can be swapped for a shared or persistent store.

mod clock;
mod entry;
mod memory;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheCounts, NegativeEntry, PositiveEntry, PositiveHit, SweepStats};
pub use memory::MemoryCache;

/// Storage for scan outcomes.
///
/// Lookups treat expired entries as misses. Writing a positive entry always
/// clears the negative entry for the same key.
pub trait OutcomeStore: Send + Sync {
    fn get_positive(&self, key: &str) -> Option<PositiveHit>;

    /// Remaining TTL of a live negative entry.
    fn get_negative(&self, key: &str) -> Option<Duration>;

    /// Overwrites the positive slot and drops any negative entry.
    /// Returns true if a negative entry was removed.
    fn set_positive(&self, key: &str, url: &str, ttl: Duration) -> bool;

    /// Overwrites the negative slot only.
    fn set_negative(&self, key: &str, ttl: Duration);

    /// Drops every expired entry in both maps.
    fn sweep_expired(&self) -> SweepStats;

    fn counts(&self) -> CacheCounts;
}
