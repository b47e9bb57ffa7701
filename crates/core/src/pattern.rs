//! Pattern-derived metric keys
//!
//! A [`PatternKeyRegistry`] turns a raw input string (a request path, a
//! dotted event name) into a metric key by running a regular expression over
//! it and joining every non-empty captured group with `/`.
//!
//! ```text
//! pattern  (\w+)\.(\w+)
//! input    "foo.bar"        ->  "foo/bar"
//! input    "a.b c.d"        ->  "a/b/c/d"
//! input    "nomatch"        ->  ""
//! ```
//!
//! The default pattern `^$` only matches the empty string and has no groups,
//! so without a pattern every input derives the empty key and all metrics of
//! one kind share a single storage key (per dimension set).

use std::sync::Arc;

use dimetrics_registry::{
    Counter, Dimensions, Gauge, GaugeFn, Histogram, Meter, Metric, RegistryError, RegistryResult,
    Timer,
};
use regex::Regex;

use crate::dimensional::DimensionalRegistry;
use crate::traits::{DimensionalMetrics, DimensionedSnapshot};

/// Pattern used when none is supplied
pub const DEFAULT_PATTERN: &str = "^$";

/// Dimensional registry that derives keys from raw names
#[derive(Debug)]
pub struct PatternKeyRegistry {
    pattern: Regex,
    inner: DimensionalRegistry,
}

impl PatternKeyRegistry {
    /// Compile `pattern` (or [`DEFAULT_PATTERN`]) over a fresh registry
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPattern`] if the pattern fails to
    /// compile.
    ///
    /// # Example
    /// ```
    /// use dimetrics_core::PatternKeyRegistry;
    ///
    /// let registry = PatternKeyRegistry::new(Some(r"(\w+)\.(\w+)"))?;
    /// assert_eq!(registry.derive_key("foo.bar"), "foo/bar");
    /// assert_eq!(registry.derive_key("nomatch"), "");
    /// # Ok::<(), dimetrics_core::RegistryError>(())
    /// ```
    pub fn new(pattern: Option<&str>) -> RegistryResult<Self> {
        Self::with_registry(pattern, DimensionalRegistry::new())
    }

    /// Compile `pattern` over an existing dimensional registry
    pub fn with_registry(pattern: Option<&str>, inner: DimensionalRegistry) -> RegistryResult<Self> {
        let source = pattern.unwrap_or(DEFAULT_PATTERN);
        let pattern = Regex::new(source).map_err(|source_err| {
            let err =
                RegistryError::InvalidPattern { pattern: source.to_string(), source: source_err };
            tracing::warn!(
                pattern = source,
                error = err.label(),
                reason = %err,
                "Rejected key pattern"
            );
            err
        })?;
        Ok(Self { pattern, inner })
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The wrapped dimensional registry
    pub fn inner(&self) -> &DimensionalRegistry {
        &self.inner
    }

    /// Derive a metric key from `raw`
    ///
    /// Collects the non-empty captured groups of every non-overlapping
    /// match, left to right, and joins them with `/`. Inputs that do not
    /// match, or patterns without groups, derive the empty string.
    pub fn derive_key(&self, raw: &str) -> String {
        let parts: Vec<&str> = self
            .pattern
            .captures_iter(raw)
            .flat_map(|captures| {
                captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|group| group.as_str())
                    .filter(|group| !group.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();

        let derived = parts.join("/");
        tracing::debug!(raw, derived = %derived, "Derived metric key");
        derived
    }
}

impl DimensionalMetrics for PatternKeyRegistry {
    /// Registers under the raw key; no derivation is applied
    fn add(&self, key: &str, metric: Metric, dimensions: &Dimensions) -> RegistryResult<Metric> {
        self.inner.add(key, metric, dimensions)
    }

    fn counter(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Counter>> {
        self.inner.counter(&self.derive_key(key), dimensions)
    }

    fn histogram(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Histogram>> {
        self.inner.histogram(&self.derive_key(key), dimensions)
    }

    fn meter(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Meter>> {
        self.inner.meter(&self.derive_key(key), dimensions)
    }

    fn timer(&self, key: &str, dimensions: &Dimensions) -> RegistryResult<Arc<Timer>> {
        self.inner.timer(&self.derive_key(key), dimensions)
    }

    fn gauge(
        &self,
        key: &str,
        gauge_fn: Option<GaugeFn>,
        default: f64,
        dimensions: &Dimensions,
    ) -> RegistryResult<Arc<Gauge>> {
        self.inner.gauge(&self.derive_key(key), gauge_fn, default, dimensions)
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn dump_metrics(&self) -> Vec<DimensionedSnapshot> {
        self.inner.dump_metrics()
    }
}
