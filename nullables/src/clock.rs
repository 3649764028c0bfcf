//! Nullable clock: deterministic time for testing.

use quorum_types::Timestamp;
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to, and never goes backwards.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of units.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    /// Move time forward to a specific value. Earlier values are ignored.
    pub fn set(&self, secs: u64) {
        if secs > self.current.get() {
            self.current.set(secs);
        }
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}
