//! In-process outcome cache.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use super::entry::{
    is_live, CacheCounts, NegativeEntry, PositiveEntry, PositiveHit, SweepStats,
};
use super::OutcomeStore;

#[derive(Debug, Default)]
struct Maps {
    positive: HashMap<String, PositiveEntry>,
    negative: HashMap<String, NegativeEntry>,
}

/// Two expiring maps behind one mutex. Process-lifetime only.
#[derive(Debug)]
pub struct MemoryCache<C = SystemClock> {
    maps: Mutex<Maps>,
    clock: C,
}

impl MemoryCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            maps: Mutex::new(Maps::default()),
            clock,
        }
    }

    fn maps(&self) -> MutexGuard<'_, Maps> {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock> OutcomeStore for MemoryCache<C> {
    fn get_positive(&self, key: &str) -> Option<PositiveHit> {
        let now = self.clock.now();
        let mut maps = self.maps();
        let entry = maps.positive.get(key)?;
        if is_live(entry.expires_at, now) {
            return Some(PositiveHit {
                url: entry.url.clone(),
                remaining: entry.expires_at - now,
            });
        }
        maps.positive.remove(key);
        None
    }

    fn get_negative(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        let mut maps = self.maps();
        let entry = *maps.negative.get(key)?;
        if is_live(entry.expires_at, now) {
            return Some(entry.expires_at - now);
        }
        maps.negative.remove(key);
        None
    }

    fn set_positive(&self, key: &str, url: &str, ttl: Duration) -> bool {
        let expires_at = self.clock.now() + ttl;
        let mut maps = self.maps();
        maps.positive.insert(
            key.to_string(),
            PositiveEntry {
                url: url.to_string(),
                expires_at,
            },
        );
        maps.negative.remove(key).is_some()
    }

    fn set_negative(&self, key: &str, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.maps()
            .negative
            .insert(key.to_string(), NegativeEntry { expires_at });
    }

    fn sweep_expired(&self) -> SweepStats {
        let now = self.clock.now();
        let mut maps = self.maps();
        let before = (maps.positive.len(), maps.negative.len());
        maps.positive.retain(|_, e| is_live(e.expires_at, now));
        maps.negative.retain(|_, e| is_live(e.expires_at, now));
        SweepStats {
            positive: before.0 - maps.positive.len(),
            negative: before.1 - maps.negative.len(),
        }
    }

    fn counts(&self) -> CacheCounts {
        let maps = self.maps();
        CacheCounts {
            positive: maps.positive.len(),
            negative: maps.negative.len(),
        }
    }
}
