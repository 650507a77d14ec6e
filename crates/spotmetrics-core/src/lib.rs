//! spotmetrics core: in-process metrics with create-or-fetch registration and
//! Prometheus text exposition.
//!
//! Application code asks a [`Registry`] for a metric by name and updates it on
//! the spot; there is no separate registration step. A scrape walks the
//! registry with [`Registry::collect`] and renders the result with
//! [`encode_text`].
//!
//! ```text
//! Registry ── name ──> Family<M> ── label values ──> child (Counter | Gauge | Histogram | Summary)
//!    └── collect() ──> FamilySnapshot* ──> encode_text() ──> bytes
//! ```
//!
//! The crate performs no I/O and carries no runtime dependency, so it can be
//! embedded in any process.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Caller mistakes
//! (conflicting redefinitions, wrong label arity, negative counter deltas,
//! writes to callback gauges) surface as [`MetricsError`] at the call site.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod collector;
pub mod error;
pub mod exposition;
pub mod family;
pub mod metric;
pub mod opts;
pub mod quantile;
pub mod registry;
pub mod vec;

pub use collector::{Collect, FamilySnapshot};
pub use error::{ErrorCode, MetricsError, Result};
pub use exposition::{encode_text, parse_text, ParsedSample, TEXT_CONTENT_TYPE};
pub use family::{Desc, Family};
pub use metric::{
    exponential_buckets, linear_buckets, Counter, Gauge, GaugeCallback, Histogram, MetricKind,
    Objective, Sample, Summary, DEFAULT_BUCKETS, DEFAULT_OBJECTIVES,
};
pub use opts::{HistogramOpts, Opts, SummaryOpts};
pub use quantile::QuantileEstimator;
pub use registry::Registry;
pub use vec::{CounterVec, GaugeVec, HistogramVec, MetricVec, SummaryVec};
