//! Metric instance types
//!
//! Five kinds of metric live in a registry: [`Counter`], [`Gauge`],
//! [`Histogram`], [`Meter`] and [`Timer`]. The registry stores them behind
//! the type-erased [`Metric`] enum and hands typed `Arc`s back to callers
//! through [`MetricInstance`].

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod meter;
pub mod sample;
pub mod timer;

use std::sync::Arc;

pub use counter::Counter;
use dimetrics_common::impl_label_conversions;
pub use gauge::{Gauge, GaugeFn};
pub use histogram::Histogram;
pub use meter::Meter;
pub use sample::{ExpDecayingSample, Snapshot};
#[cfg(feature = "serde")]
use serde::Serialize;
pub use timer::{Timer, TimerContext};

/// Kind of a stored metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Meter,
    Timer,
}

impl_label_conversions!(MetricKind {
    Counter => "counter",
    Gauge => "gauge",
    Histogram => "histogram",
    Meter => "meter",
    Timer => "timer",
});

/// Type-erased handle to a registered metric
#[derive(Debug, Clone)]
pub enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Counter(_) => MetricKind::Counter,
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Meter(_) => MetricKind::Meter,
            Self::Timer(_) => MetricKind::Timer,
        }
    }

    /// Point-in-time values of the metric
    pub fn snapshot(&self) -> MetricSnapshot {
        match self {
            Self::Counter(counter) => MetricSnapshot::Counter { count: counter.count() },
            Self::Gauge(gauge) => MetricSnapshot::Gauge { value: gauge.value() },
            Self::Histogram(histogram) => MetricSnapshot::Histogram(HistogramSummary::of(histogram)),
            Self::Meter(meter) => MetricSnapshot::Meter(MeterSummary::of(meter)),
            Self::Timer(timer) => MetricSnapshot::Timer(TimerSummary::of(timer)),
        }
    }

    /// Whether both handles point at the same instance
    pub fn ptr_eq(&self, other: &Metric) -> bool {
        match (self, other) {
            (Self::Counter(a), Self::Counter(b)) => Arc::ptr_eq(a, b),
            (Self::Gauge(a), Self::Gauge(b)) => Arc::ptr_eq(a, b),
            (Self::Histogram(a), Self::Histogram(b)) => Arc::ptr_eq(a, b),
            (Self::Meter(a), Self::Meter(b)) => Arc::ptr_eq(a, b),
            (Self::Timer(a), Self::Timer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Concrete metric type that can be stored in and fetched from a registry
pub trait MetricInstance: Send + Sync + 'static {
    /// Kind tag of this type
    const KIND: MetricKind;

    /// Wrap a shared instance into the type-erased handle
    fn into_metric(self: Arc<Self>) -> Metric;

    /// Typed view of a handle, `None` when the kinds differ
    fn from_metric(metric: &Metric) -> Option<Arc<Self>>;
}

macro_rules! impl_metric_instance {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl MetricInstance for $ty {
                const KIND: MetricKind = MetricKind::$ty;

                fn into_metric(self: Arc<Self>) -> Metric {
                    Metric::$ty(self)
                }

                fn from_metric(metric: &Metric) -> Option<Arc<Self>> {
                    match metric {
                        Metric::$ty(inner) => Some(Arc::clone(inner)),
                        _ => None,
                    }
                }
            }

            impl From<Arc<$ty>> for Metric {
                fn from(instance: Arc<$ty>) -> Self {
                    Metric::$ty(instance)
                }
            }
        )+
    };
}

impl_metric_instance!(Counter, Gauge, Histogram, Meter, Timer);

/// Distribution statistics shared by histograms and timers
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

impl HistogramSummary {
    fn of(histogram: &Histogram) -> Self {
        let snapshot = histogram.snapshot();
        Self {
            count: histogram.count(),
            sum: histogram.sum(),
            min: histogram.min(),
            max: histogram.max(),
            mean: histogram.mean(),
            stddev: histogram.stddev(),
            median: snapshot.median(),
            p75: snapshot.p75(),
            p95: snapshot.p95(),
            p99: snapshot.p99(),
            p999: snapshot.p999(),
        }
    }
}

/// Event count and rates in events per second
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MeterSummary {
    pub count: u64,
    pub m1_rate: f64,
    pub m5_rate: f64,
    pub m15_rate: f64,
    pub mean_rate: f64,
}

impl MeterSummary {
    fn of(meter: &Meter) -> Self {
        Self {
            count: meter.count(),
            m1_rate: meter.one_minute_rate(),
            m5_rate: meter.five_minute_rate(),
            m15_rate: meter.fifteen_minute_rate(),
            mean_rate: meter.mean_rate(),
        }
    }
}

/// Duration distribution (seconds) and call rates of a timer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimerSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
    pub m1_rate: f64,
    pub m5_rate: f64,
    pub m15_rate: f64,
    pub mean_rate: f64,
}

impl TimerSummary {
    fn of(timer: &Timer) -> Self {
        let snapshot = timer.snapshot();
        Self {
            count: timer.count(),
            sum: timer.sum(),
            min: timer.min(),
            max: timer.max(),
            mean: timer.mean(),
            stddev: timer.stddev(),
            median: snapshot.median(),
            p75: snapshot.p75(),
            p95: snapshot.p95(),
            p99: snapshot.p99(),
            p999: snapshot.p999(),
            m1_rate: timer.one_minute_rate(),
            m5_rate: timer.five_minute_rate(),
            m15_rate: timer.fifteen_minute_rate(),
            mean_rate: timer.mean_rate(),
        }
    }
}

/// Point-in-time values of one metric
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum MetricSnapshot {
    Counter { count: i64 },
    Gauge { value: f64 },
    Histogram(HistogramSummary),
    Meter(MeterSummary),
    Timer(TimerSummary),
}

impl MetricSnapshot {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Counter { .. } => MetricKind::Counter,
            Self::Gauge { .. } => MetricKind::Gauge,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Meter(_) => MetricKind::Meter,
            Self::Timer(_) => MetricKind::Timer,
        }
    }
}
