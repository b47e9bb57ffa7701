//! Call instrumentation
//!
//! Four decorators record something about every call of a wrapped
//! function, under a metric carrying a fixed dimension set:
//!
//! | Factory | Metric | Records |
//! |---------|--------|---------|
//! | [`count_calls_with_dims`] | counter | `+1` before each call |
//! | [`meter_calls_with_dims`] | meter | one event before each call |
//! | [`hist_calls_with_dims`] | histogram | the return value, when numeric |
//! | [`time_calls_with_dims`] | timer | wall time of each call |
//!
//! The metric name defaults to `<qualified name>_calls`, where the qualified
//! name is the wrapped function's path as reported by
//! [`qualified_name_of`]. Metrics are resolved on every call through the
//! global registry unless [`CallDecorator::using`] pins one.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//!
//! use dimetrics_core::{count_calls_with_dims, DimensionalMetrics, DimensionalRegistry, Dimensions};
//!
//! fn add(a: u32, b: u32) -> u32 {
//!     a + b
//! }
//!
//! let registry = Arc::new(DimensionalRegistry::new());
//! let counted = count_calls_with_dims(Dimensions::from([("service", "math")]))
//!     .using(registry.clone())
//!     .wrap(add);
//!
//! assert_eq!(counted.call((2, 3))?, 5);
//! assert_eq!(counted.call((4, 4))?, 8);
//!
//! let calls = registry.counter(counted.metric_name(), &Dimensions::from([("service", "math")]))?;
//! assert_eq!(calls.count(), 2);
//! # Ok::<(), dimetrics_core::RegistryError>(())
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use dimetrics_registry::{qualified_name_of, Dimensions, RegistryResult};

use crate::global::global_registry;
use crate::traits::DimensionalMetrics;

/// Callable taking its arguments as a tuple
///
/// Implemented for every `Fn` of up to six arguments, so `call((a, b))`
/// forwards to `f(a, b)`.
pub trait Callable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Ret, $($ty),*> Callable<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            type Output = Ret;

            fn invoke(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                (self)($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A a);
impl_callable!(A a, B b);
impl_callable!(A a, B b, C c);
impl_callable!(A a, B b, C c, D d);
impl_callable!(A a, B b, C c, D d, E e);
impl_callable!(A a, B b, C c, D d, E e, G g);

/// Return value that may be recorded by a histogram
///
/// Integers and floats yield their value. `Option` and `Result` yield the
/// value of a `Some` or `Ok` payload, and JSON numbers count as numeric with
/// the `serde` feature. Everything else is skipped by
/// [`hist_calls_with_dims`].
pub trait HistogramSample {
    fn sample_value(&self) -> Option<f64>;
}

macro_rules! impl_numeric_sample {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HistogramSample for $ty {
                fn sample_value(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )+
    };
}

impl_numeric_sample!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

macro_rules! impl_skipped_sample {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HistogramSample for $ty {
                fn sample_value(&self) -> Option<f64> {
                    None
                }
            }
        )+
    };
}

impl_skipped_sample!((), bool, char, str, String);

impl<T: HistogramSample + ?Sized> HistogramSample for &T {
    fn sample_value(&self) -> Option<f64> {
        (**self).sample_value()
    }
}

impl<T: HistogramSample> HistogramSample for Option<T> {
    fn sample_value(&self) -> Option<f64> {
        self.as_ref().and_then(HistogramSample::sample_value)
    }
}

impl<T: HistogramSample, E> HistogramSample for Result<T, E> {
    fn sample_value(&self) -> Option<f64> {
        self.as_ref().ok().and_then(HistogramSample::sample_value)
    }
}

#[cfg(feature = "serde")]
impl HistogramSample for serde_json::Value {
    fn sample_value(&self) -> Option<f64> {
        match self {
            serde_json::Value::Number(number) => number.as_f64(),
            _ => None,
        }
    }
}

/// Marker for [`count_calls_with_dims`]
#[derive(Debug, Clone, Copy)]
pub struct CountCalls;

/// Marker for [`meter_calls_with_dims`]
#[derive(Debug, Clone, Copy)]
pub struct MeterCalls;

/// Marker for [`hist_calls_with_dims`]
#[derive(Debug, Clone, Copy)]
pub struct HistCalls;

/// Marker for [`time_calls_with_dims`]
#[derive(Debug, Clone, Copy)]
pub struct TimeCalls;

/// Configured decorator, ready to [`wrap`](CallDecorator::wrap) a function
pub struct CallDecorator<K> {
    dimensions: Dimensions,
    name: Option<String>,
    registry: Option<Arc<dyn DimensionalMetrics>>,
    _kind: PhantomData<K>,
}

impl<K> CallDecorator<K> {
    fn new(dimensions: Dimensions) -> Self {
        Self { dimensions, name: None, registry: None, _kind: PhantomData }
    }

    /// Use `name` as the metric base name instead of the qualified name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record into `registry` instead of the global registry
    pub fn using(mut self, registry: Arc<dyn DimensionalMetrics>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Wrap `inner`, fixing the metric name
    pub fn wrap<F>(self, inner: F) -> Instrumented<F, K> {
        let name = qualified_name_of(&inner);
        let metric_name = format!("{}_calls", self.name.as_deref().unwrap_or(name));
        tracing::debug!(function = name, metric = %metric_name, "Instrumented callable");
        Instrumented {
            inner,
            name,
            metric_name,
            dimensions: self.dimensions,
            registry: self.registry,
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for CallDecorator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDecorator")
            .field("kind", &std::any::type_name::<K>())
            .field("dimensions", &self.dimensions)
            .field("name", &self.name)
            .field("pinned_registry", &self.registry.is_some())
            .finish()
    }
}

/// Decorator counting calls with a counter
pub fn count_calls_with_dims(dimensions: Dimensions) -> CallDecorator<CountCalls> {
    CallDecorator::new(dimensions)
}

/// Decorator marking a meter on every call
pub fn meter_calls_with_dims(dimensions: Dimensions) -> CallDecorator<MeterCalls> {
    CallDecorator::new(dimensions)
}

/// Decorator recording numeric return values in a histogram
///
/// Besides plain integers and floats, a numeric payload inside `Some(_)` or
/// `Ok(_)` is recorded too; `None`, `Err` and non-numeric returns are
/// skipped. See [`HistogramSample`] for the full set.
pub fn hist_calls_with_dims(dimensions: Dimensions) -> CallDecorator<HistCalls> {
    CallDecorator::new(dimensions)
}

/// Decorator timing every call with a timer
pub fn time_calls_with_dims(dimensions: Dimensions) -> CallDecorator<TimeCalls> {
    CallDecorator::new(dimensions)
}

/// Wrapped function that records a metric on every call
///
/// `call` returns `Err` only when the metric cannot be resolved (a kind
/// conflict on the metric name); the wrapped function is not invoked in
/// that case. Panics in the wrapped function propagate unchanged.
pub struct Instrumented<F, K> {
    inner: F,
    name: &'static str,
    metric_name: String,
    dimensions: Dimensions,
    registry: Option<Arc<dyn DimensionalMetrics>>,
    _kind: PhantomData<K>,
}

impl<F, K> Instrumented<F, K> {
    /// Qualified name of the wrapped function
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// The wrapped function, uninstrumented
    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn registry(&self) -> Arc<dyn DimensionalMetrics> {
        match &self.registry {
            Some(registry) => Arc::clone(registry),
            None => global_registry(),
        }
    }
}

impl<F> Instrumented<F, CountCalls> {
    pub fn call<Args>(&self, args: Args) -> RegistryResult<F::Output>
    where
        F: Callable<Args>,
    {
        self.registry().counter(&self.metric_name, &self.dimensions)?.inc(1);
        Ok(self.inner.invoke(args))
    }
}

impl<F> Instrumented<F, MeterCalls> {
    pub fn call<Args>(&self, args: Args) -> RegistryResult<F::Output>
    where
        F: Callable<Args>,
    {
        self.registry().meter(&self.metric_name, &self.dimensions)?.mark(1);
        Ok(self.inner.invoke(args))
    }
}

impl<F> Instrumented<F, HistCalls> {
    pub fn call<Args>(&self, args: Args) -> RegistryResult<F::Output>
    where
        F: Callable<Args>,
        F::Output: HistogramSample,
    {
        let histogram = self.registry().histogram(&self.metric_name, &self.dimensions)?;
        let output = self.inner.invoke(args);
        match output.sample_value() {
            Some(value) => histogram.update(value),
            None => tracing::trace!(metric = %self.metric_name, "Skipped non-numeric return value"),
        }
        Ok(output)
    }
}

impl<F> Instrumented<F, TimeCalls> {
    pub fn call<Args>(&self, args: Args) -> RegistryResult<F::Output>
    where
        F: Callable<Args>,
    {
        let timer = self.registry().timer(&self.metric_name, &self.dimensions)?;
        let _context = timer.time();
        Ok(self.inner.invoke(args))
    }
}

impl<F, K> fmt::Debug for Instrumented<F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("name", &self.name)
            .field("metric_name", &self.metric_name)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}
