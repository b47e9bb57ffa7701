//! Time source abstraction
//!
//! Meters, timers and decaying reservoirs read time through [`Clock`] so
//! that production code uses the monotonic system clock while tests drive
//! time forward explicitly with [`MockClock`].

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::sync::lock_or_recover;

/// Trait for time operations to enable deterministic testing
pub trait Clock: Send + Sync + Debug + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Seconds elapsed between `origin` and now, as a float
    ///
    /// Saturates at zero when `origin` lies in the future.
    fn seconds_since(&self, origin: Instant) -> f64 {
        self.now().saturating_duration_since(origin).as_secs_f64()
    }
}

/// Shared, type-erased clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Convenience constructor returning a [`SharedClock`]
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed counter, so a test can hand one clone to a
/// registry and keep another to advance time.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        *lock_or_recover(&self.elapsed, "MockClock::elapsed") += duration;
    }

    /// Advance the mock clock by whole seconds
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        *lock_or_recover(&self.elapsed, "MockClock::elapsed")
    }

    /// Clone this clock into a [`SharedClock`] handle
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}
