#![forbid(unsafe_code)]

//! Injectable time source.
//!
//! The stack never reads the wall clock directly; it asks a [`Clock`]. Hosts
//! use [`SystemClock`]; tests drive a `ManualClock` so timer-dependent
//! transitions are deterministic.

use web_time::Instant;

#[cfg(any(test, feature = "test-helpers"))]
use std::cell::Cell;
#[cfg(any(test, feature = "test-helpers"))]
use std::rc::Rc;
#[cfg(any(test, feature = "test-helpers"))]
use web_time::Duration;

/// Source of the current instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time via `web_time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the stack.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ManualClock {
    /// Start at the current wall-clock instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start at a specific instant.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
