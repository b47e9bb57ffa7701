//! # dimetrics core
//!
//! Dimensional metrics on top of the flat registry in `dimetrics-registry`.
//!
//! This crate contains:
//! - [`DimensionalRegistry`]: metrics keyed by a name plus a dimension set
//! - [`PatternKeyRegistry`]: metric keys derived from raw input by regex
//! - [`global`]: a process-wide registry and free-function accessors
//! - [`instrument`]: decorators counting, metering, measuring and timing
//!   function calls
//!
//! ## Example
//! ```
//! use dimetrics_core::{DimensionalMetrics, DimensionalRegistry, Dimensions};
//!
//! let registry = DimensionalRegistry::new();
//! let dims = Dimensions::new().with("region", "eu").with("host", "api-1");
//!
//! registry.counter("requests", &dims)?.inc(1);
//!
//! let dump = registry.dump_metrics();
//! assert_eq!(dump[0].key, "requests[host=api-1,region=eu]");
//! assert_eq!(dump[0].metric, "requests");
//! # Ok::<(), dimetrics_core::RegistryError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod dimensional;
pub mod global;
pub mod instrument;
pub mod pattern;
pub mod traits;

pub use dimensional::DimensionalRegistry;
pub use dimetrics_registry::{
    Counter, Dimensions, Gauge, GaugeFn, Histogram, Meter, Metric, MetricKind, MetricSnapshot,
    RegistryConfig, RegistryError, RegistryResult, Timer, TimerContext,
};
pub use global::{
    clear, counter, dump_metrics, gauge, global_registry, histogram, meter, set_global_registry,
    timer,
};
pub use instrument::{
    count_calls_with_dims, hist_calls_with_dims, meter_calls_with_dims, time_calls_with_dims,
    CallDecorator, Callable, HistogramSample, Instrumented,
};
pub use pattern::{PatternKeyRegistry, DEFAULT_PATTERN};
pub use traits::{DimensionalMetrics, DimensionedSnapshot};
