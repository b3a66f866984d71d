//! Clock abstraction for callers of the collision-risk core.
//!
//! The core never reads time itself: every staleness check, throttle and
//! cooldown takes a caller-supplied `now_ms`. Production callers use
//! [`WallClock`]; the simulator and tests use [`ManualClock`] so a run is
//! reproducible from its seed alone.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    ///
    /// Only differences between successive values are meaningful to the
    /// core; the epoch is the implementation's choice.
    fn now_ms(&self) -> i64;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for simulation and tests.
///
/// Clones share the same underlying time cell, so a runner can hand the
/// clock to several components and advance them all at once.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<Mutex<i64>>,
}

impl ManualClock {
    /// Creates a clock starting at the given time.
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Advances the clock by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: i64) {
        *self.now_ms.lock().unwrap() += delta_ms;
    }

    /// Sets the clock to an absolute time.
    pub fn set_ms(&self, now_ms: i64) {
        *self.now_ms.lock().unwrap() = now_ms;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        *self.now_ms.lock().unwrap()
    }
}
