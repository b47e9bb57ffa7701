//! Flat-namespace metrics registry
//!
//! One map from string key to metric instance. Lookups are get-or-create:
//! asking for a counter under a key that is free creates one, asking again
//! returns the same `Arc`. Asking for a different kind under an occupied key
//! fails with [`RegistryError::KindMismatch`].
//!
//! ## Design
//! - **Read-lock fast path**: existing metrics are returned without taking
//!   the write lock
//! - **Poison-safe locking** through `dimetrics_common` helpers
//! - **Injected clock** shared by every time-dependent instance

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use dimetrics_common::{read_or_recover, write_or_recover, SharedClock, SystemClock};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::metrics::{
    Counter, Gauge, GaugeFn, Histogram, Meter, Metric, MetricInstance, MetricSnapshot, Timer,
};

/// Registry of metric instances keyed by flat string keys
#[derive(Debug)]
pub struct MetricsRegistry {
    metrics: RwLock<HashMap<String, Metric>>,
    clock: SharedClock,
    config: RegistryConfig,
}

impl MetricsRegistry {
    /// Registry on the system clock with default settings
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    /// Registry whose instances read time from `clock`
    pub fn with_clock(clock: SharedClock) -> Self {
        Self { metrics: RwLock::new(HashMap::new()), clock, config: RegistryConfig::default() }
    }

    /// Registry with custom instance settings
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(config: RegistryConfig, clock: SharedClock) -> RegistryResult<Self> {
        config.validate()?;
        Ok(Self { metrics: RwLock::new(HashMap::new()), clock, config })
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a caller-built instance under `key`
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyRegistered`] if `key` holds a metric of the
    ///   same kind
    /// - [`RegistryError::KindMismatch`] if `key` holds another kind
    pub fn add<T: MetricInstance>(&self, key: &str, metric: Arc<T>) -> RegistryResult<Arc<T>> {
        self.add_metric(key, Arc::clone(&metric).into_metric())?;
        Ok(metric)
    }

    /// Type-erased form of [`MetricsRegistry::add`]
    pub fn add_metric(&self, key: &str, metric: Metric) -> RegistryResult<Metric> {
        let requested = metric.kind();
        let mut metrics = self.write();
        if let Some(existing) = metrics.get(key) {
            let existing = existing.kind();
            let err = if existing == requested {
                RegistryError::AlreadyRegistered { key: key.to_string(), kind: existing }
            } else {
                RegistryError::KindMismatch { key: key.to_string(), existing, requested }
            };
            tracing::debug!(key, error = err.label(), "Rejected metric");
            return Err(err);
        }

        metrics.insert(key.to_string(), metric.clone());
        tracing::debug!(key, kind = %requested, "Added metric");
        Ok(metric)
    }

    pub fn counter(&self, key: &str) -> RegistryResult<Arc<Counter>> {
        self.get_or_create(key, Counter::new)
    }

    pub fn histogram(&self, key: &str) -> RegistryResult<Arc<Histogram>> {
        self.get_or_create(key, || Histogram::with_config(&self.config, self.clock.clone()))
    }

    pub fn meter(&self, key: &str) -> RegistryResult<Arc<Meter>> {
        self.get_or_create(key, || Meter::with_config(&self.config, self.clock.clone()))
    }

    pub fn timer(&self, key: &str) -> RegistryResult<Arc<Timer>> {
        self.get_or_create(key, || Timer::with_config(&self.config, self.clock.clone()))
    }

    /// Get or create a gauge
    ///
    /// A new gauge computes its value through `gauge_fn` when one is given,
    /// otherwise it is a settable gauge starting at `default`. Both arguments
    /// are ignored when the gauge already exists.
    pub fn gauge(
        &self,
        key: &str,
        gauge_fn: Option<GaugeFn>,
        default: f64,
    ) -> RegistryResult<Arc<Gauge>> {
        self.get_or_create(key, || match gauge_fn {
            Some(callback) => Gauge::callback(callback),
            None => Gauge::simple(default),
        })
    }

    /// Remove every metric
    pub fn clear(&self) {
        let mut metrics = self.write();
        let removed = metrics.len();
        metrics.clear();
        tracing::info!(removed, "Cleared metrics registry");
    }

    /// Handle to the metric stored under `key`
    pub fn get_metric(&self, key: &str) -> Option<Metric> {
        self.read().get(key).cloned()
    }

    /// Point-in-time values of the metric stored under `key`
    pub fn get_metrics(&self, key: &str) -> Option<MetricSnapshot> {
        // Snapshot outside the map lock; gauge callbacks run arbitrary code
        self.get_metric(key).map(|metric| metric.snapshot())
    }

    /// Point-in-time values of every metric, ordered by key
    pub fn dump_metrics(&self) -> BTreeMap<String, MetricSnapshot> {
        let entries: Vec<(String, Metric)> =
            self.read().iter().map(|(key, metric)| (key.clone(), metric.clone())).collect();
        entries.into_iter().map(|(key, metric)| (key, metric.snapshot())).collect()
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn get_or_create<T, F>(&self, key: &str, make: F) -> RegistryResult<Arc<T>>
    where
        T: MetricInstance,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.read().get(key) {
            return Self::typed(key, existing);
        }

        let mut metrics = self.write();
        // Another thread may have created it between the two locks
        if let Some(existing) = metrics.get(key) {
            return Self::typed(key, existing);
        }

        let instance = Arc::new(make());
        metrics.insert(key.to_string(), Arc::clone(&instance).into_metric());
        tracing::debug!(key, kind = %T::KIND, "Created metric");
        Ok(instance)
    }

    fn typed<T: MetricInstance>(key: &str, metric: &Metric) -> RegistryResult<Arc<T>> {
        T::from_metric(metric).ok_or_else(|| RegistryError::KindMismatch {
            key: key.to_string(),
            existing: metric.kind(),
            requested: T::KIND,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Metric>> {
        read_or_recover(&self.metrics, "MetricsRegistry::metrics")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Metric>> {
        write_or_recover(&self.metrics, "MetricsRegistry::metrics")
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dimetrics_common::MockClock;

    use super::*;
    use crate::metrics::MetricKind;

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let registry = MetricsRegistry::new();

        let first = registry.counter("requests").unwrap();
        let second = registry.counter("requests").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    /// Validates requesting another kind under an occupied key.
    ///
    /// Assertions:
    /// - Ensures the error is `KindMismatch` naming both kinds.
    /// - Confirms the stored counter is untouched.
    #[test]
    fn test_kind_mismatch() {
        let registry = MetricsRegistry::new();
        registry.counter("jobs").unwrap().inc(2);

        let err = registry.histogram("jobs").unwrap_err();

        assert!(matches!(
            err,
            RegistryError::KindMismatch {
                existing: MetricKind::Counter,
                requested: MetricKind::Histogram,
                ..
            }
        ));
        assert_eq!(registry.counter("jobs").unwrap().count(), 2);
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let registry = MetricsRegistry::new();
        let meter = Arc::new(Meter::new());

        let stored = registry.add("events", Arc::clone(&meter)).unwrap();
        assert!(Arc::ptr_eq(&stored, &meter));

        let same_kind = registry.add("events", Arc::new(Meter::new())).unwrap_err();
        assert!(matches!(same_kind, RegistryError::AlreadyRegistered { .. }));

        let other_kind = registry.add("events", Arc::new(Counter::new())).unwrap_err();
        assert!(matches!(other_kind, RegistryError::KindMismatch { .. }));
    }

    /// Validates both gauge flavours and that arguments only matter on
    /// creation.
    ///
    /// Assertions:
    /// - Confirms a simple gauge starts at the supplied default.
    /// - Confirms a callback gauge reports its callback value.
    /// - Confirms a second lookup ignores a new default.
    #[test]
    fn test_gauge_creation() {
        let registry = MetricsRegistry::new();

        let simple = registry.gauge("queue_depth", None, 7.0).unwrap();
        assert_eq!(simple.value(), 7.0);

        let callback: GaugeFn = Arc::new(|| 42.0);
        let computed = registry.gauge("workers", Some(callback), f64::NAN).unwrap();
        assert_eq!(computed.value(), 42.0);

        let again = registry.gauge("queue_depth", None, 1.0).unwrap();
        assert_eq!(again.value(), 7.0);
    }

    #[test]
    fn test_clear_empties_registry() {
        let registry = MetricsRegistry::new();
        registry.counter("a").unwrap();
        registry.timer("b").unwrap();

        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.get_metric("a").is_none());
        assert_eq!(registry.counter("a").unwrap().count(), 0);
    }

    #[test]
    fn test_dump_metrics_is_sorted() {
        let registry = MetricsRegistry::new();
        registry.counter("zeta").unwrap().inc(1);
        registry.counter("alpha").unwrap().inc(2);

        let dump = registry.dump_metrics();

        let keys: Vec<&str> = dump.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
        assert_eq!(dump["alpha"], MetricSnapshot::Counter { count: 2 });
        assert_eq!(registry.keys(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_instances_share_injected_clock() {
        let clock = MockClock::new();
        let registry = MetricsRegistry::with_clock(clock.shared());
        let timer = registry.timer("latency").unwrap();

        let context = timer.time();
        clock.advance(Duration::from_millis(1500));
        drop(context);

        assert_eq!(timer.max(), 1.5);
    }

    #[test]
    fn test_with_config_validates() {
        let invalid = RegistryConfig { reservoir_size: 0, ..RegistryConfig::default() };

        let result = MetricsRegistry::with_config(invalid, SystemClock::shared());

        assert!(matches!(result, Err(RegistryError::InvalidConfig { .. })));
    }
}
