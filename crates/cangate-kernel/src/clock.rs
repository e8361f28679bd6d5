//! Microsecond timestamps for the real-time checkpoint.
//!
//! Timestamps are `u32` microseconds from a free-running counter and wrap
//! roughly every 71.6 minutes.  Always compute elapsed time with
//! [`elapsed_us`], never with plain subtraction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Source of monotonic microsecond timestamps.
pub trait Clock: Send + Sync {
    fn now_us(&self) -> u32;
}

/// Modular elapsed time from `last` to `now`, correct across one wrap.
pub fn elapsed_us(now: u32, last: u32) -> u32 {
    now.wrapping_sub(last)
}

/// Process-relative wall clock truncated to 32 bits.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u32 {
        // Truncation is the wrap.
        self.origin.elapsed().as_micros() as u32
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same counter, so a replay driver or test can keep one
/// handle while the gate owns another.
///
/// ```
/// use cangate_kernel::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(10);
/// let handle = clock.clone();
/// handle.advance(5);
/// assert_eq!(clock.now_us(), 15);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new(start_us: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start_us)),
        }
    }

    pub fn set(&self, now_us: u32) {
        self.now.store(now_us, Ordering::Relaxed);
    }

    /// Move forward by `delta_us`, wrapping at `u32::MAX`.
    pub fn advance(&self, delta_us: u32) {
        let now = self.now.load(Ordering::Relaxed);
        self.now.store(now.wrapping_add(delta_us), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
}
