//! Durations and call rates
//!
//! A timer is a histogram of elapsed seconds paired with a meter of how
//! often something was timed. [`Timer::time`] hands out a scoped
//! [`TimerContext`]; the elapsed time is recorded exactly once, when the
//! context is stopped or dropped, including during unwinding.

use std::time::{Duration, Instant};

use dimetrics_common::{SharedClock, SystemClock};

use super::histogram::Histogram;
use super::meter::Meter;
use super::sample::Snapshot;
use crate::config::RegistryConfig;

/// Histogram of durations plus a meter of events
#[derive(Debug)]
pub struct Timer {
    clock: SharedClock,
    histogram: Histogram,
    meter: Meter,
}

impl Timer {
    /// Timer with default settings on the system clock
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default(), SystemClock::shared())
    }

    pub fn with_config(config: &RegistryConfig, clock: SharedClock) -> Self {
        Self {
            histogram: Histogram::with_config(config, clock.clone()),
            meter: Meter::with_config(config, clock.clone()),
            clock,
        }
    }

    /// Start a scoped timing region
    ///
    /// # Example
    /// ```
    /// use dimetrics_registry::metrics::Timer;
    ///
    /// let timer = Timer::new();
    /// {
    ///     let _context = timer.time();
    ///     // ... timed work ...
    /// }
    /// assert_eq!(timer.count(), 1);
    /// ```
    pub fn time(&self) -> TimerContext<'_> {
        TimerContext { timer: self, start: self.clock.now(), recorded: false }
    }

    /// Record an externally measured duration
    pub fn update(&self, elapsed: Duration) {
        self.histogram.update(elapsed.as_secs_f64());
        self.meter.mark(1);
    }

    pub fn count(&self) -> u64 {
        self.histogram.count()
    }

    /// Total recorded time in seconds
    pub fn sum(&self) -> f64 {
        self.histogram.sum()
    }

    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    pub fn min(&self) -> f64 {
        self.histogram.min()
    }

    pub fn max(&self) -> f64 {
        self.histogram.max()
    }

    pub fn stddev(&self) -> f64 {
        self.histogram.stddev()
    }

    pub fn var(&self) -> f64 {
        self.histogram.var()
    }

    /// Quantile view over recorded durations (seconds)
    pub fn snapshot(&self) -> Snapshot {
        self.histogram.snapshot()
    }

    pub fn one_minute_rate(&self) -> f64 {
        self.meter.one_minute_rate()
    }

    pub fn five_minute_rate(&self) -> f64 {
        self.meter.five_minute_rate()
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        self.meter.fifteen_minute_rate()
    }

    pub fn mean_rate(&self) -> f64 {
        self.meter.mean_rate()
    }

    pub fn clear(&self) {
        self.histogram.clear();
        self.meter.clear();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped timing region returned by [`Timer::time`]
#[derive(Debug)]
#[must_use = "dropping the context immediately records a near-zero duration"]
pub struct TimerContext<'a> {
    timer: &'a Timer,
    start: Instant,
    recorded: bool,
}

impl TimerContext<'_> {
    /// Time elapsed so far, without recording
    pub fn elapsed(&self) -> Duration {
        self.timer.clock.now().saturating_duration_since(self.start)
    }

    /// Record the elapsed time and end the region
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !self.recorded {
            self.recorded = true;
            self.timer.update(elapsed);
        }
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        self.record();
    }
}
