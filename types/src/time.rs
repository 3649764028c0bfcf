//! Timestamp type used throughout the engine.
//!
//! Time is always supplied by the host: the engine never reads a wall clock.
//! Units are abstract (the host decides, typically Unix seconds); the clock is
//! expected to be monotonically non-decreasing across operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in host time.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// The timestamp `duration` units after this one, or `None` on overflow.
    pub fn checked_add(&self, duration: u64) -> Option<Timestamp> {
        self.0.checked_add(duration).map(Self)
    }

    /// Units elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
