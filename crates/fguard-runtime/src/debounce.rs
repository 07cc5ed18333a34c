#![forbid(unsafe_code)]

//! Trailing, latest-wins debouncing.
//!
//! Each [`Debouncer::trigger`] cancels whatever was pending and schedules a
//! new deadline `delay` after `now`, returning a [`DebounceTicket`]. The host
//! arranges for the ticket to come back once the delay has passed; only the
//! most recent ticket fires.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use fguard_runtime::debounce::Debouncer;
//!
//! let mut debouncer = Debouncer::new(Duration::from_millis(50));
//! let t0 = Instant::now();
//!
//! let first = debouncer.trigger(t0);
//! let second = debouncer.trigger(t0 + Duration::from_millis(20));
//!
//! // The first ticket was superseded.
//! assert!(!debouncer.fire(first, t0 + Duration::from_millis(60)));
//! // The second fires once its own deadline has passed.
//! assert!(!debouncer.fire(second, t0 + Duration::from_millis(60)));
//! assert!(debouncer.fire(second, t0 + Duration::from_millis(70)));
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Identifies one scheduled firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DebounceTicket(u64);

impl DebounceTicket {
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DebounceTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Debounce({})", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: DebounceTicket,
    deadline: Instant,
}

/// A single cancellable trailing timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    next: u64,
    pending: Option<Pending>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next: 1,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending firing and schedule a new one.
    pub fn trigger(&mut self, now: Instant) -> DebounceTicket {
        let ticket = DebounceTicket(self.next);
        self.next += 1;
        self.pending = Some(Pending {
            ticket,
            deadline: now + self.delay,
        });
        ticket
    }

    /// Consume the pending firing if `ticket` is current and due.
    ///
    /// Stale tickets and early arrivals return `false`; an early arrival
    /// leaves the pending firing in place.
    pub fn fire(&mut self, ticket: DebounceTicket, now: Instant) -> bool {
        match self.pending {
            Some(p) if p.ticket == ticket && now >= p.deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending firing, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The ticket that would fire next.
    #[must_use]
    pub fn pending_ticket(&self) -> Option<DebounceTicket> {
        self.pending.map(|p| p.ticket)
    }

    /// Time left before the pending firing is due.
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|p| p.deadline.saturating_duration_since(now))
    }
}
