//! Value distributions
//!
//! A histogram combines a decaying reservoir (for quantiles) with exact
//! running aggregates over every value ever recorded: count, sum, min, max
//! and a Welford variance.

use std::sync::Mutex;

use dimetrics_common::{lock_or_recover, SharedClock, SystemClock};

use super::sample::{ExpDecayingSample, Snapshot};
use crate::config::RegistryConfig;

#[derive(Debug)]
struct HistogramState {
    sample: ExpDecayingSample,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    // Welford running mean and sum of squared deviations
    mean: f64,
    m2: f64,
}

impl HistogramState {
    fn new(sample: ExpDecayingSample) -> Self {
        Self {
            sample,
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }

    fn reset(&mut self) {
        self.sample.clear();
        self.count = 0;
        self.sum = 0.0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        self.mean = 0.0;
        self.m2 = 0.0;
    }
}

/// Distribution of recorded values
#[derive(Debug)]
pub struct Histogram {
    state: Mutex<HistogramState>,
}

impl Histogram {
    /// Histogram with default reservoir settings on the system clock
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default(), SystemClock::shared())
    }

    pub fn with_config(config: &RegistryConfig, clock: SharedClock) -> Self {
        let sample = ExpDecayingSample::new(config, clock);
        Self { state: Mutex::new(HistogramState::new(sample)) }
    }

    /// Record a value
    pub fn update(&self, value: f64) {
        let mut state = self.lock();
        state.count += 1;
        state.sample.update(value);
        state.sum += value;
        state.min = state.min.min(value);
        state.max = state.max.max(value);

        let delta = value - state.mean;
        state.mean += delta / state.count as f64;
        state.m2 += delta * (value - state.mean);
    }

    pub fn count(&self) -> u64 {
        self.lock().count
    }

    pub fn sum(&self) -> f64 {
        self.lock().sum
    }

    /// Smallest recorded value, `0.0` when empty
    pub fn min(&self) -> f64 {
        let state = self.lock();
        if state.count == 0 {
            0.0
        } else {
            state.min
        }
    }

    /// Largest recorded value, `0.0` when empty
    pub fn max(&self) -> f64 {
        let state = self.lock();
        if state.count == 0 {
            0.0
        } else {
            state.max
        }
    }

    /// Arithmetic mean, `0.0` when empty
    pub fn mean(&self) -> f64 {
        let state = self.lock();
        if state.count == 0 {
            0.0
        } else {
            state.sum / state.count as f64
        }
    }

    /// Sample variance, `0.0` with fewer than two values
    pub fn var(&self) -> f64 {
        let state = self.lock();
        if state.count <= 1 {
            0.0
        } else {
            state.m2 / (state.count - 1) as f64
        }
    }

    pub fn stddev(&self) -> f64 {
        self.var().sqrt()
    }

    /// Quantile view over the reservoir
    pub fn snapshot(&self) -> Snapshot {
        self.lock().sample.snapshot()
    }

    /// Reset all measurements
    pub fn clear(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HistogramState> {
        lock_or_recover(&self.state, "Histogram::state")
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}
