use std::time::Duration;

use spotmetrics_core::{
    exponential_buckets, CounterVec, HistogramOpts, HistogramVec, Opts, Registry, Result,
    SummaryOpts, SummaryVec,
};

/// Scrape outcome label values.
pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_DRAINING: &str = "draining";

#[derive(Clone)]
pub struct ExporterMetrics {
    scrapes: CounterVec,
    scrape_duration: HistogramVec,
    scrape_bytes: SummaryVec,
}

impl ExporterMetrics {
    pub fn register(registry: &Registry) -> Result<Self> {
        let scrapes = registry.counter(
            Opts::new("spotmetrics_scrapes_total")
                .help("Scrapes served by the exporter.")
                .labels(&["outcome"]),
        )?;
        let scrape_duration = registry.histogram(
            HistogramOpts::new("spotmetrics_scrape_duration_seconds")
                .help("Time spent collecting and encoding one scrape.")
                // 100us .. ~1.6s
                .buckets(exponential_buckets(0.0001, 4.0, 8)?),
        )?;
        let scrape_bytes = registry.summary(
            SummaryOpts::new("spotmetrics_scrape_bytes")
                .help("Size of encoded scrape responses.")
                .objectives(&[(0.5, 0.05), (0.99, 0.001)])
                .max_age(Duration::from_secs(600)),
        )?;
        Ok(Self {
            scrapes,
            scrape_duration,
            scrape_bytes,
        })
    }

    /// Record a served scrape.
    pub fn observe_scrape(&self, elapsed: Duration, bytes: usize) -> Result<()> {
        self.scrapes.with_label_values(&[OUTCOME_OK])?.inc();
        self.scrape_duration.observe(elapsed.as_secs_f64())?;
        self.scrape_bytes.observe(bytes as f64)?;
        Ok(())
    }

    /// Record a scrape served after shutdown began. Only the counter moves.
    pub fn observe_draining(&self) -> Result<()> {
        self.scrapes.with_label_values(&[OUTCOME_DRAINING])?.inc();
        Ok(())
    }
}
