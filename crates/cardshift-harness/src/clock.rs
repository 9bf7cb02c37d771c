#![forbid(unsafe_code)]

//! Deterministic time source.

use std::time::Duration;

use web_time::Instant;

/// A clock that only moves when told to.
///
/// All instants are `base + elapsed`, so runs with the same script produce
/// the same relative timings regardless of wall time.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    base: Instant,
    elapsed: Duration,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.base + self.elapsed
    }

    /// Time since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Move forward and return the new instant.
    pub fn advance(&mut self, by: Duration) -> Instant {
        self.elapsed += by;
        self.now()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}
