//! Capability trait shared by the dimensional registries
//!
//! Both [`DimensionalRegistry`](crate::DimensionalRegistry) and
//! [`PatternKeyRegistry`](crate::PatternKeyRegistry) implement
//! [`DimensionalMetrics`], so the global slot and the call decorators can
//! hold either behind an `Arc<dyn DimensionalMetrics>`.

use std::fmt;
use std::sync::Arc;

use dimetrics_registry::{
    Counter, Dimensions, Gauge, GaugeFn, Histogram, Meter, Metric, MetricSnapshot, RegistryResult,
    Timer,
};

/// Snapshot of one stored metric with the name and dimensions it was
/// registered under
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionedSnapshot {
    /// Resolved storage key
    pub key: String,
    /// Metric name as supplied at registration
    pub metric: String,
    pub dimensions: Dimensions,
    pub snapshot: MetricSnapshot,
}

/// Registry that creates metrics under a name plus a dimension set
///
/// Every method resolves `(key, dimensions)` to a storage key before touching
/// the underlying flat registry. Kind conflicts surface unchanged as
/// [`RegistryError::KindMismatch`](dimetrics_registry::RegistryError::KindMismatch).
pub trait DimensionalMetrics: Send + Sync + fmt::Debug {
    /// Register a caller-built metric
    fn add(&self, key: &str, metric: Metric, dimensions: &Dimensions) -> RegistryResult<Metric>;

    fn counter(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Counter>>;

    fn histogram(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Histogram>>;

    fn meter(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Meter>>;

    fn timer(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Timer>>;

    /// Get or create a gauge; `gauge_fn` and `default` only apply on creation
    fn gauge(
        &self,
        key: &str,
        gauge_fn: Option<GaugeFn>,
        default: f64,
        dimensions: &Dimensions,
    ) -> RegistryResult<Arc<Gauge>>;

    /// Drop every metric and all dimension metadata
    fn clear(&self);

    /// Snapshots of every stored metric, ordered by resolved key
    fn dump_metrics(&self) -> Vec<DimensionedSnapshot>;
}
