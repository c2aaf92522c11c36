//! Injectable time sources for the timer engine.
//!
//! Production code runs on [`SystemClock`]; demos and tests swap in
//! [`ScaledClock`] or [`ManualClock`] instead of threading a test-mode flag
//! through the game logic.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// A monotonic time source. `now()` reports time elapsed since the clock's
/// epoch (usually its creation).
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock time, anchored at construction.
///
/// Built on `tokio::time::Instant` so paused-runtime tests auto-advance.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Wraps another clock and multiplies its elapsed time by a constant factor.
/// A factor of 20.0 makes every phase run twenty times faster.
#[derive(Debug)]
pub struct ScaledClock<C> {
    inner: C,
    factor: f64,
}

impl<C: Clock> ScaledClock<C> {
    pub fn new(inner: C, factor: f64) -> Self {
        Self { inner, factor }
    }
}

impl ScaledClock<SystemClock> {
    /// Accelerated wall clock.
    pub fn system(factor: f64) -> Self {
        Self::new(SystemClock::new(), factor)
    }
}

impl<C: Clock> Clock for ScaledClock<C> {
    fn now(&self) -> Duration {
        self.inner.now().mul_f64(self.factor)
    }
}

/// A clock that only moves when told to. For tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}
