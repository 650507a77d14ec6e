//! Metric value holders.
//!
//! The set of metric types is closed: counter, gauge, histogram and summary.
//! Each implements [`Metric`], which the family uses to build children and
//! turn their live state into [`Sample`]s at scrape time.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod summary;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

pub use counter::Counter;
pub use gauge::{Gauge, GaugeCallback};
pub use histogram::{exponential_buckets, linear_buckets, Histogram, DEFAULT_BUCKETS};
pub use summary::{Objective, Summary, DEFAULT_OBJECTIVES};

/// Declared type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    /// Name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

/// One exposition line worth of data. Built during collection, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    pub(crate) fn new(name: impl Into<String>, labels: Vec<(String, String)>, value: f64) -> Self {
        Self {
            name: name.into(),
            labels,
            value,
        }
    }

    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Counter {}
    impl Sealed for super::Gauge {}
    impl Sealed for super::Histogram {}
    impl Sealed for super::Summary {}
}

/// Capability shared by the four metric types.
pub trait Metric: sealed::Sealed + Send + Sync + Sized + 'static {
    const KIND: MetricKind;

    /// Per-family construction options (bucket bounds, objectives, ...).
    type Options: Send + Sync + 'static;

    /// Build a fresh child for a family.
    fn build(name: &Arc<str>, options: &Self::Options) -> Self;

    /// Append this child's samples. `labels` are the declared label pairs.
    fn collect(&self, name: &str, labels: &[(String, String)], out: &mut Vec<Sample>);
}

/// `f64` stored as bits in an `AtomicU64`.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub(crate) fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn add(&self, delta: f64) {
        // The closure never returns None, so the update always lands.
        let _ = self.0.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
            Some((f64::from_bits(bits) + delta).to_bits())
        });
    }
}

/// Declared labels plus one extra pair (`le`, `quantile`).
pub(crate) fn with_extra_label(
    labels: &[(String, String)],
    name: &str,
    value: String,
) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(labels.len() + 1);
    out.extend_from_slice(labels);
    out.push((name.to_string(), value));
    out
}
