//! Cache entry types.

use std::time::{Duration, Instant};

/// Remembered successful resolution.
#[derive(Debug, Clone)]
pub struct PositiveEntry {
    pub url: String,
    pub expires_at: Instant,
}

/// Remembered exhausted scan.
#[derive(Debug, Clone, Copy)]
pub struct NegativeEntry {
    pub expires_at: Instant,
}

/// Positive lookup hit: the cached URL and how long it stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositiveHit {
    pub url: String,
    pub remaining: Duration,
}

/// Number of entries removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub positive: usize,
    pub negative: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

/// Current number of entries in each map (expired ones included until swept).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounts {
    pub positive: usize,
    pub negative: usize,
}

pub(super) fn is_live(expires_at: Instant, now: Instant) -> bool {
    now < expires_at
}
