//! Top-level facade crate for spotmetrics.
//!
//! Re-exports the core types and the exporter library so users can depend on a single crate.
//!
//! ```no_run
//! use spotmetrics::{Opts, Registry};
//!
//! let registry = Registry::new();
//! let requests = registry
//!     .counter(Opts::new("requests_total").help("Requests served."))
//!     .unwrap();
//! requests.inc().unwrap();
//! print!("{}", String::from_utf8_lossy(&registry.render()));
//! ```

pub mod core {
    pub use spotmetrics_core::*;
}

pub mod exporter {
    pub use spotmetrics_exporter::*;
}

pub use spotmetrics_core::{
    encode_text, Counter, CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec,
    MetricsError, Opts, Registry, Result, Summary, SummaryOpts, SummaryVec, TEXT_CONTENT_TYPE,
};
