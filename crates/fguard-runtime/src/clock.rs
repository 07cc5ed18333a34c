#![forbid(unsafe_code)]

//! Time sources.
//!
//! The controller never reads a clock itself: every event is handled at an
//! explicit [`Now`]. Hosts use [`SystemClock`]; tests and the simulator use
//! [`ManualClock`] so debounce deadlines and ages are reproducible.

use std::cell::Cell;
use std::time::{Duration, Instant};

use time::{OffsetDateTime, PrimitiveDateTime};

/// A point in time on both clocks the form cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    /// Monotonic time, for debouncing and note expiry.
    pub instant: Instant,
    /// Wall-clock time, for age evaluation.
    pub wall: PrimitiveDateTime,
}

/// Source of [`Now`].
pub trait Clock {
    fn now(&self) -> Now;
}

/// The real clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Now {
        Now {
            instant: Instant::now(),
            wall: wall_now(),
        }
    }
}

#[cfg(feature = "local-time")]
fn wall_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

#[cfg(not(feature = "local-time"))]
fn wall_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: PrimitiveDateTime,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    /// Start at `wall`, with the monotonic origin taken now.
    #[must_use]
    pub fn starting_at(wall: PrimitiveDateTime) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: wall,
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Move both clocks forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Time advanced since creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Now {
        let elapsed = self.elapsed.get();
        Now {
            instant: self.origin + elapsed,
            wall: self.wall_origin + elapsed,
        }
    }
}
