//! Process-wide registry accessors
//!
//! The global slot holds an `Arc<dyn DimensionalMetrics>`. It is filled with
//! a default [`DimensionalRegistry`] on first access and can be swapped as a
//! whole with [`set_global_registry`]. Handles obtained before a swap keep
//! pointing at the registry they came from.

use std::sync::{Arc, RwLock};

use dimetrics_common::{read_or_recover, write_or_recover};
use dimetrics_registry::{
    Counter, Dimensions, Gauge, GaugeFn, Histogram, Meter, RegistryResult, Timer,
};
use once_cell::sync::Lazy;

use crate::dimensional::DimensionalRegistry;
use crate::traits::{DimensionalMetrics, DimensionedSnapshot};

static GLOBAL_REGISTRY: Lazy<RwLock<Arc<dyn DimensionalMetrics>>> = Lazy::new(|| {
    tracing::debug!("Initialized global dimensional registry");
    RwLock::new(Arc::new(DimensionalRegistry::new()))
});

/// Current global registry
pub fn global_registry() -> Arc<dyn DimensionalMetrics> {
    read_or_recover(&*GLOBAL_REGISTRY, "global_registry").clone()
}

/// Replace the global registry, returning the previous one
pub fn set_global_registry(registry: Arc<dyn DimensionalMetrics>) -> Arc<dyn DimensionalMetrics> {
    let previous =
        std::mem::replace(&mut *write_or_recover(&*GLOBAL_REGISTRY, "global_registry"), registry);
    tracing::info!("Replaced global dimensional registry");
    previous
}

pub fn counter(key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Counter>> {
    global_registry().counter(key, dimensions)
}

pub fn histogram(key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Histogram>> {
    global_registry().histogram(key, dimensions)
}

pub fn meter(key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Meter>> {
    global_registry().meter(key, dimensions)
}

pub fn timer(key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Timer>> {
    global_registry().timer(key, dimensions)
}

pub fn gauge(
    key: &str,
    gauge_fn: Option<GaugeFn>,
    default: f64,
    dimensions: &Dimensions,
) -> RegistryResult<Arc<Gauge>> {
    global_registry().gauge(key, gauge_fn, default, dimensions)
}

/// Clear the current global registry
pub fn clear() {
    global_registry().clear();
}

pub fn dump_metrics() -> Vec<DimensionedSnapshot> {
    global_registry().dump_metrics()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard};

    use once_cell::sync::Lazy;

    static GLOBAL_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    /// Serialize tests that touch the global slot
    pub(crate) fn lock_global() -> MutexGuard<'static, ()> {
        GLOBAL_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
