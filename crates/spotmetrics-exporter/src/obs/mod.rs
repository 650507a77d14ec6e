//! The exporter's own instrumentation.
//!
//! Scrape counters and timings are registered in the same registry the
//! exporter serves, so they show up next to the application's metrics.

pub mod metrics;
pub mod process;

pub use metrics::ExporterMetrics;
