//! Event rates
//!
//! A meter counts events and derives three exponentially-weighted moving
//! average rates (1, 5 and 15 minute windows, like UNIX load averages) plus
//! the mean rate since creation. All rates are events per second.
//!
//! EWMAs advance lazily: every read or mark first applies the ticks that
//! elapsed since the last one, so no background thread is needed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use dimetrics_common::{lock_or_recover, SharedClock, SystemClock};

use crate::config::RegistryConfig;

const ONE_MINUTE: f64 = 60.0;
const FIVE_MINUTES: f64 = 5.0 * 60.0;
const FIFTEEN_MINUTES: f64 = 15.0 * 60.0;

#[derive(Debug, Clone)]
struct Ewma {
    alpha: f64,
    interval_secs: f64,
    rate: f64,
    uncounted: f64,
    initialized: bool,
}

impl Ewma {
    fn new(window_secs: f64, interval: Duration) -> Self {
        let interval_secs = interval.as_secs_f64();
        Self {
            alpha: 1.0 - (-interval_secs / window_secs).exp(),
            interval_secs,
            rate: 0.0,
            uncounted: 0.0,
            initialized: false,
        }
    }

    fn update(&mut self, value: f64) {
        self.uncounted += value;
    }

    fn tick(&mut self) {
        let instant_rate = self.uncounted / self.interval_secs;
        self.uncounted = 0.0;
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }

    fn reset(&mut self) {
        self.rate = 0.0;
        self.uncounted = 0.0;
        self.initialized = false;
    }
}

#[derive(Debug)]
struct MeterState {
    count: u64,
    start: Instant,
    last_tick: Instant,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

/// Rate-of-events meter
#[derive(Debug)]
pub struct Meter {
    clock: SharedClock,
    tick_interval: Duration,
    state: Mutex<MeterState>,
}

impl Meter {
    /// Meter with the default tick interval on the system clock
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default(), SystemClock::shared())
    }

    pub fn with_config(config: &RegistryConfig, clock: SharedClock) -> Self {
        let now = clock.now();
        let interval = config.tick_interval;
        Self {
            clock,
            tick_interval: interval,
            state: Mutex::new(MeterState {
                count: 0,
                start: now,
                last_tick: now,
                m1: Ewma::new(ONE_MINUTE, interval),
                m5: Ewma::new(FIVE_MINUTES, interval),
                m15: Ewma::new(FIFTEEN_MINUTES, interval),
            }),
        }
    }

    /// Record `n` events
    pub fn mark(&self, n: u64) {
        let mut state = self.lock();
        self.tick_if_necessary(&mut state);
        state.count += n;
        let value = n as f64;
        state.m1.update(value);
        state.m5.update(value);
        state.m15.update(value);
    }

    pub fn count(&self) -> u64 {
        self.lock().count
    }

    pub fn one_minute_rate(&self) -> f64 {
        let mut state = self.lock();
        self.tick_if_necessary(&mut state);
        state.m1.rate
    }

    pub fn five_minute_rate(&self) -> f64 {
        let mut state = self.lock();
        self.tick_if_necessary(&mut state);
        state.m5.rate
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        let mut state = self.lock();
        self.tick_if_necessary(&mut state);
        state.m15.rate
    }

    /// Events per second since creation (or the last clear)
    pub fn mean_rate(&self) -> f64 {
        let state = self.lock();
        if state.count == 0 {
            return 0.0;
        }
        let elapsed = self.clock.seconds_since(state.start);
        if elapsed > 0.0 {
            state.count as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Reset count and rates, restarting the mean-rate window
    pub fn clear(&self) {
        let now = self.clock.now();
        let mut state = self.lock();
        state.count = 0;
        state.start = now;
        state.last_tick = now;
        state.m1.reset();
        state.m5.reset();
        state.m15.reset();
    }

    fn tick_if_necessary(&self, state: &mut MeterState) {
        let now = self.clock.now();
        let age = now.saturating_duration_since(state.last_tick);
        if age <= self.tick_interval {
            return;
        }

        let interval_nanos = self.tick_interval.as_nanos();
        let ticks = age.as_nanos() / interval_nanos;
        let remainder = Duration::from_nanos((age.as_nanos() % interval_nanos) as u64);
        state.last_tick = now - remainder;

        for _ in 0..ticks {
            state.m1.tick();
            state.m5.tick();
            state.m15.tick();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MeterState> {
        lock_or_recover(&self.state, "Meter::state")
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}
