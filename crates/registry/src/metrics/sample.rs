//! Forward-decaying reservoir and quantile snapshots
//!
//! The reservoir keeps a statistically representative sample of a stream,
//! weighted toward recent values. Each incoming value gets a priority of
//! `exp(alpha * age) / u` with `u` uniform in `(0, 1]`; the reservoir keeps
//! the `size` highest priorities. Because priorities grow exponentially with
//! time they are periodically rescaled against a new landmark.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use dimetrics_common::SharedClock;
use rand::Rng;

use crate::config::RegistryConfig;

#[derive(Debug, Clone, Copy)]
struct Weighted {
    priority: f64,
    value: f64,
}

impl PartialEq for Weighted {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Weighted {}

impl PartialOrd for Weighted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weighted {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }
}

/// Exponentially decaying reservoir sample
///
/// Not synchronized; the owning histogram serializes access.
#[derive(Debug)]
pub struct ExpDecayingSample {
    size: usize,
    alpha: f64,
    rescale_threshold: f64,
    clock: SharedClock,
    origin: Instant,
    landmark: f64,
    next_rescale: f64,
    // Min-heap on priority: the root is the first candidate for eviction
    values: BinaryHeap<Reverse<Weighted>>,
}

impl ExpDecayingSample {
    pub fn new(config: &RegistryConfig, clock: SharedClock) -> Self {
        let origin = clock.now();
        let rescale_threshold = config.rescale_threshold.as_secs_f64();
        Self {
            size: config.reservoir_size,
            alpha: config.decay_alpha,
            rescale_threshold,
            clock,
            origin,
            landmark: 0.0,
            next_rescale: rescale_threshold,
            values: BinaryHeap::with_capacity(config.reservoir_size),
        }
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn update(&mut self, value: f64) {
        let now = self.clock.seconds_since(self.origin);
        if now >= self.next_rescale {
            self.rescale(now);
        }

        // Uniform in (0, 1] so the priority stays finite
        let u = 1.0 - rand::thread_rng().gen::<f64>();
        let priority = (self.alpha * (now - self.landmark)).exp() / u;
        let candidate = Weighted { priority, value };

        if self.values.len() < self.size {
            self.values.push(Reverse(candidate));
        } else if let Some(Reverse(lowest)) = self.values.peek() {
            if priority > lowest.priority {
                self.values.pop();
                self.values.push(Reverse(candidate));
            }
        }
    }

    fn rescale(&mut self, now: f64) {
        let previous = self.landmark;
        self.landmark = now;
        self.next_rescale = now + self.rescale_threshold;

        let factor = (-self.alpha * (self.landmark - previous)).exp();
        self.values = self
            .values
            .drain()
            .map(|Reverse(w)| Reverse(Weighted { priority: w.priority * factor, value: w.value }))
            .collect();

        tracing::trace!(landmark = now, factor, samples = self.values.len(), "Rescaled reservoir");
    }

    /// Sorted copy of the sampled values
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.values.iter().map(|Reverse(w)| w.value).collect())
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.origin = self.clock.now();
        self.landmark = 0.0;
        self.next_rescale = self.rescale_threshold;
    }
}

/// Immutable, sorted view of sampled values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: Vec<f64>,
}

impl Snapshot {
    /// Build a snapshot from unsorted values
    pub fn new(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `quantile` (0.0 to 1.0)
    ///
    /// Interpolates linearly at position `quantile * (n + 1)`. Returns
    /// `None` for an empty snapshot or a quantile outside `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dimetrics_registry::metrics::Snapshot;
    ///
    /// let snapshot = Snapshot::new((1..=10).map(f64::from).collect());
    /// assert_eq!(snapshot.percentile(0.5), Some(5.5));
    /// assert_eq!(snapshot.percentile(0.99), Some(10.0));
    /// ```
    pub fn percentile(&self, quantile: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&quantile) || self.values.is_empty() {
            return None;
        }

        let len = self.values.len();
        let pos = quantile * (len as f64 + 1.0);
        if pos < 1.0 {
            return self.values.first().copied();
        }
        if pos >= len as f64 {
            return self.values.last().copied();
        }

        let index = pos.floor() as usize;
        let lower = self.values[index - 1];
        let upper = self.values[index];
        Some(lower + (pos - pos.floor()) * (upper - lower))
    }

    pub fn median(&self) -> f64 {
        self.percentile(0.5).unwrap_or(0.0)
    }

    pub fn p75(&self) -> f64 {
        self.percentile(0.75).unwrap_or(0.0)
    }

    pub fn p95(&self) -> f64 {
        self.percentile(0.95).unwrap_or(0.0)
    }

    pub fn p99(&self) -> f64 {
        self.percentile(0.99).unwrap_or(0.0)
    }

    pub fn p999(&self) -> f64 {
        self.percentile(0.999).unwrap_or(0.0)
    }

    pub fn min(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Format as a human-readable summary
    pub fn summary(&self) -> String {
        if self.values.is_empty() {
            return "No measurements recorded".to_string();
        }

        format!(
            "size={}, median={:.3}, p75={:.3}, p95={:.3}, p99={:.3}, p999={:.3}",
            self.size(),
            self.median(),
            self.p75(),
            self.p95(),
            self.p99(),
            self.p999()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dimetrics_common::MockClock;

    use super::*;

    fn small_config(size: usize) -> RegistryConfig {
        RegistryConfig { reservoir_size: size, ..RegistryConfig::default() }
    }

    #[test]
    fn test_snapshot_interpolation() {
        let snapshot = Snapshot::new((1..=10).rev().map(f64::from).collect());

        assert_eq!(snapshot.median(), 5.5);
        assert!((snapshot.p75() - 8.25).abs() < 1e-9);
        assert_eq!(snapshot.p99(), 10.0);
        assert_eq!(snapshot.percentile(0.05), Some(1.0));
        assert_eq!(snapshot.min(), Some(1.0));
        assert_eq!(snapshot.max(), Some(10.0));
    }

    /// Validates out-of-range quantiles and empty snapshots.
    ///
    /// Assertions:
    /// - Confirms `percentile(1.5)` and `percentile(-0.1)` return `None`.
    /// - Confirms an empty snapshot reports `0.0` for the median.
    #[test]
    fn test_snapshot_edge_cases() {
        let snapshot = Snapshot::new(vec![3.0]);
        assert_eq!(snapshot.percentile(1.5), None);
        assert_eq!(snapshot.percentile(-0.1), None);
        assert_eq!(snapshot.median(), 3.0);

        let empty = Snapshot::default();
        assert_eq!(empty.median(), 0.0);
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.summary(), "No measurements recorded");
    }

    #[test]
    fn test_reservoir_is_bounded() {
        let clock = MockClock::new();
        let mut sample = ExpDecayingSample::new(&small_config(10), clock.shared());

        for i in 0..100 {
            sample.update(f64::from(i));
        }

        assert_eq!(sample.len(), 10);
        assert_eq!(sample.snapshot().size(), 10);
    }

    /// Validates rescaling keeps the sample bounded and priorities usable.
    ///
    /// Assertions:
    /// - Confirms the sample still holds 10 values after two hours.
    /// - Ensures the newest values dominate after decay.
    #[test]
    fn test_rescale_after_threshold() {
        let clock = MockClock::new();
        let mut sample = ExpDecayingSample::new(&small_config(10), clock.shared());

        for _ in 0..10 {
            sample.update(1.0);
        }

        clock.advance(Duration::from_secs(2 * 60 * 60));
        for _ in 0..10 {
            sample.update(1_000.0);
        }

        assert_eq!(sample.len(), 10);
        assert!(sample.snapshot().median() > 1.0);
    }

    #[test]
    fn test_clear_empties_sample() {
        let clock = MockClock::new();
        let mut sample = ExpDecayingSample::new(&small_config(4), clock.shared());
        sample.update(2.0);

        sample.clear();

        assert!(sample.is_empty());
    }
}
