//! Dimensional registry
//!
//! Wraps a flat [`MetricsRegistry`] and a [`MetricMetadata`] store. Every
//! creation call resolves `(name, dimensions)` through the metadata store
//! first and then delegates to the flat registry with the resolved key, so
//! the flat registry never needs to know about dimensions.
//!
//! ## Concurrency
//! Registrations hold a shared gate; [`DimensionalRegistry::clear`] holds it
//! exclusively. A registration therefore either completes before a clear or
//! starts after it, and metadata never describes a metric that is gone.

use std::sync::{Arc, RwLock};

use dimetrics_common::{read_or_recover, write_or_recover, SharedClock};
use dimetrics_registry::{
    Counter, Dimensions, Gauge, GaugeFn, Histogram, Meter, Metric, MetricMetadata, MetricsRegistry,
    RegistryConfig, RegistryResult, Timer,
};

use crate::traits::{DimensionalMetrics, DimensionedSnapshot};

/// Registry creating metrics under a name plus dimensions
#[derive(Debug, Default)]
pub struct DimensionalRegistry {
    gate: RwLock<()>,
    metadata: MetricMetadata,
    registry: MetricsRegistry,
}

impl DimensionalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose time-dependent metrics read from `clock`
    pub fn with_clock(clock: SharedClock) -> Self {
        Self::from_registry(MetricsRegistry::with_clock(clock))
    }

    /// Registry with custom instance settings
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`](dimetrics_registry::RegistryError::InvalidConfig)
    /// if `config` fails validation.
    pub fn with_config(config: RegistryConfig, clock: SharedClock) -> RegistryResult<Self> {
        Ok(Self::from_registry(MetricsRegistry::with_config(config, clock)?))
    }

    /// Wrap an existing flat registry
    pub fn from_registry(registry: MetricsRegistry) -> Self {
        Self { gate: RwLock::new(()), metadata: MetricMetadata::new(), registry }
    }

    pub fn metadata(&self) -> &MetricMetadata {
        &self.metadata
    }

    /// The underlying flat registry
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    fn resolve(&self, key: &str, dimensions: &Dimensions) -> String {
        let resolved = self.metadata.register(key, dimensions);
        tracing::trace!(metric = key, key = %resolved, "Resolved dimensional key");
        resolved
    }

    fn register<T>(
        &self,
        key: &str,
        dimensions: &Dimensions,
        create: impl FnOnce(&MetricsRegistry, &str) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        let _gate = read_or_recover(&self.gate, "DimensionalRegistry::gate");
        let resolved = self.resolve(key, dimensions);
        create(&self.registry, &resolved)
    }
}

impl DimensionalMetrics for DimensionalRegistry {
    fn add(&self, key: &str, metric: Metric, dimensions: &Dimensions) -> RegistryResult<Metric> {
        self.register(key, dimensions, |registry, resolved| registry.add_metric(resolved, metric))
    }

    fn counter(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Counter>> {
        self.register(key, dimensions, MetricsRegistry::counter)
    }

    fn histogram(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Histogram>> {
        self.register(key, dimensions, MetricsRegistry::histogram)
    }

    fn meter(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Meter>> {
        self.register(key, dimensions, MetricsRegistry::meter)
    }

    fn timer(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Timer>> {
        self.register(key, dimensions, MetricsRegistry::timer)
    }

    fn gauge(
        &self,
        key: &str,
        gauge_fn: Option<GaugeFn>,
        default: f64,
        dimensions: &Dimensions,
    ) -> RegistryResult<Arc<Gauge>> {
        self.register(key, dimensions, |registry, resolved| {
            registry.gauge(resolved, gauge_fn, default)
        })
    }

    fn clear(&self) {
        let _gate = write_or_recover(&self.gate, "DimensionalRegistry::gate");
        self.metadata.clear();
        self.registry.clear();
        tracing::info!("Cleared dimensional registry");
    }

    fn dump_metrics(&self) -> Vec<DimensionedSnapshot> {
        self.registry
            .dump_metrics()
            .into_iter()
            .map(|(key, snapshot)| {
                let (metric, dimensions) = self.metadata.get_metric_and_dims(&key);
                DimensionedSnapshot { key, metric, dimensions, snapshot }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dimetrics_common::MockClock;
    use dimetrics_registry::{MetricKind, MetricSnapshot, RegistryError};

    use super::*;

    fn dims(pairs: &[(&str, &str)]) -> Dimensions {
        pairs.iter().copied().collect()
    }

    /// Validates same `(name, dims)` yields the same instance and different
    /// dims a distinct one.
    ///
    /// Assertions:
    /// - Confirms repeated lookups are `Arc::ptr_eq`.
    /// - Confirms another dimension value produces another instance.
    /// - Confirms metadata maps the resolved key back to the inputs.
    #[test]
    fn test_same_dims_same_instance() {
        let registry = DimensionalRegistry::new();
        let eu = dims(&[("region", "eu"), ("tier", "web")]);
        let us = dims(&[("region", "us"), ("tier", "web")]);

        let first = registry.counter("requests", &eu).unwrap();
        let second = registry.counter("requests", &eu).unwrap();
        let other = registry.counter("requests", &us).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));

        let entry = registry.metadata().get_metadata("requests[region=eu,tier=web]").unwrap();
        assert_eq!(entry.metric, "requests");
        assert_eq!(entry.dimensions, eu);
    }

    #[test]
    fn test_no_dimensions_uses_name() {
        let registry = DimensionalRegistry::new();

        registry.meter("logins", &Dimensions::new()).unwrap().mark(1);

        assert!(registry.registry().get_metric("logins").is_some());
        assert!(registry.metadata().is_empty());
    }

    #[test]
    fn test_kind_mismatch_passes_through() {
        let registry = DimensionalRegistry::new();
        let dims = dims(&[("queue", "mail")]);
        registry.counter("jobs", &dims).unwrap();

        let err = registry.timer("jobs", &dims).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::KindMismatch {
                existing: MetricKind::Counter,
                requested: MetricKind::Timer,
                ..
            }
        ));
    }

    #[test]
    fn test_add_resolves_key() {
        let registry = DimensionalRegistry::new();
        let dims = dims(&[("pool", "primary")]);
        let counter = Arc::new(Counter::new());

        let stored = registry.add("connections", Metric::from(Arc::clone(&counter)), &dims).unwrap();

        assert!(stored.ptr_eq(&Metric::from(Arc::clone(&counter))));
        let fetched = registry.counter("connections", &dims).unwrap();
        assert!(Arc::ptr_eq(&fetched, &counter));
    }

    /// Validates `clear` empties both stores and the registry stays usable.
    ///
    /// Assertions:
    /// - Confirms metadata and flat registry are empty after clear.
    /// - Confirms re-registration yields a fresh zeroed counter.
    #[test]
    fn test_clear_behaves_like_fresh() {
        let registry = DimensionalRegistry::new();
        let dims = dims(&[("host", "a")]);
        let before = registry.counter("hits", &dims).unwrap();
        before.inc(10);

        registry.clear();

        assert!(registry.metadata().is_empty());
        assert!(registry.registry().is_empty());
        assert!(registry.dump_metrics().is_empty());

        let after = registry.counter("hits", &dims).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.count(), 0);
    }

    #[test]
    fn test_gauge_callback() {
        let registry = DimensionalRegistry::new();
        let callback: GaugeFn = Arc::new(|| 3.5);

        let gauge = registry.gauge("pool_size", Some(callback), f64::NAN, &dims(&[("db", "main")]));

        assert_eq!(gauge.unwrap().value(), 3.5);
    }

    #[test]
    fn test_dump_metrics_carries_dimensions() {
        let clock = MockClock::new();
        let registry = DimensionalRegistry::with_clock(clock.shared());
        let dims = dims(&[("route", "/login")]);
        registry.counter("hits", &dims).unwrap().inc(4);
        registry.timer("latency", &Dimensions::new()).unwrap().update(Duration::from_secs(1));

        let dump = registry.dump_metrics();

        assert_eq!(dump.len(), 2);
        assert_eq!(dump[0].key, "hits[route=/login]");
        assert_eq!(dump[0].metric, "hits");
        assert_eq!(dump[0].dimensions, dims);
        assert_eq!(dump[0].snapshot, MetricSnapshot::Counter { count: 4 });
        assert_eq!(dump[1].metric, "latency");
        assert!(dump[1].dimensions.is_empty());
    }
}
