//! Flat-namespace metrics registry for dimetrics.
//!
//! This crate holds everything the dimensional layer builds on:
//!
//! - [`metrics`]: counter, gauge, histogram, meter and timer instances
//! - [`MetricsRegistry`]: get-or-create storage keyed by flat strings
//! - [`MetricMetadata`]: maps resolved keys back to `(name, dimensions)`
//! - [`Dimensions`]: ordered dimension sets
//!
//! # Example
//!
//! ```
//! use dimetrics_registry::{Dimensions, MetricMetadata, MetricsRegistry};
//!
//! let registry = MetricsRegistry::new();
//! let metadata = MetricMetadata::new();
//!
//! let key = metadata.register("requests", &Dimensions::from([("route", "/login")]));
//! registry.counter(&key)?.inc(1);
//!
//! assert_eq!(key, "requests[route=/login]");
//! assert_eq!(registry.counter(&key)?.count(), 1);
//! # Ok::<(), dimetrics_registry::RegistryError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod config;
pub mod dimensions;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod qualname;
pub mod registry;

pub use config::{RegistryConfig, RegistryConfigBuilder};
pub use dimensions::Dimensions;
pub use error::{RegistryError, RegistryResult};
pub use metadata::{MetadataEntry, MetricMetadata};
pub use metrics::{
    Counter, Gauge, GaugeFn, Histogram, Meter, Metric, MetricInstance, MetricKind, MetricSnapshot,
    Snapshot, Timer, TimerContext,
};
pub use qualname::qualified_name_of;
pub use registry::MetricsRegistry;
