//! Point-in-time gauges
//!
//! A gauge either holds a value the application sets, or computes its value
//! on demand through a callback.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback producing the current gauge value
pub type GaugeFn = Arc<dyn Fn() -> f64 + Send + Sync>;

enum GaugeSource {
    Simple(AtomicU64),
    Callback(GaugeFn),
}

/// Gauge reporting a single floating-point value
pub struct Gauge {
    source: GaugeSource,
}

impl Gauge {
    /// Settable gauge starting at `initial`
    pub fn simple(initial: f64) -> Self {
        Self { source: GaugeSource::Simple(AtomicU64::new(initial.to_bits())) }
    }

    /// Gauge whose value is computed by `callback` on every read
    pub fn callback(callback: GaugeFn) -> Self {
        Self { source: GaugeSource::Callback(callback) }
    }

    /// Convenience wrapper around [`Gauge::callback`]
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self::callback(Arc::new(callback))
    }

    pub fn value(&self) -> f64 {
        match &self.source {
            GaugeSource::Simple(bits) => f64::from_bits(bits.load(Ordering::Acquire)),
            GaugeSource::Callback(callback) => callback(),
        }
    }

    /// Set the value of a simple gauge
    ///
    /// Callback gauges own their value; setting one is a no-op.
    pub fn set_value(&self, value: f64) {
        match &self.source {
            GaugeSource::Simple(bits) => bits.store(value.to_bits(), Ordering::Release),
            GaugeSource::Callback(_) => {
                tracing::debug!(value, "Ignoring set_value on callback gauge");
            }
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.source, GaugeSource::Callback(_))
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::simple(f64::NAN)
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.is_callback() { "callback" } else { "simple" };
        f.debug_struct("Gauge").field("source", &source).finish()
    }
}
