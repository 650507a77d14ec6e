use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{MetricsError, Result};

use super::{AtomicF64, Metric, MetricKind, Sample};

/// Zero-argument function evaluated at scrape time.
pub type GaugeCallback = Arc<dyn Fn() -> f64 + Send + Sync>;

enum Source {
    Stored(AtomicF64),
    Callback(GaugeCallback),
}

/// Value that can go up and down, or a read-only view over a callback.
pub struct Gauge {
    name: Arc<str>,
    source: Source,
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.source {
            Source::Stored(_) => "stored",
            Source::Callback(_) => "callback",
        };
        f.debug_struct("Gauge")
            .field("name", &self.name)
            .field("mode", &mode)
            .finish()
    }
}

impl Gauge {
    pub(crate) fn from_callback(name: &Arc<str>, callback: GaugeCallback) -> Self {
        Self {
            name: Arc::clone(name),
            source: Source::Callback(callback),
        }
    }

    fn stored(&self) -> Result<&AtomicF64> {
        match &self.source {
            Source::Stored(v) => Ok(v),
            Source::Callback(_) => Err(MetricsError::ReadOnlyGauge {
                name: self.name.to_string(),
            }),
        }
    }

    pub fn set(&self, value: f64) -> Result<()> {
        self.stored()?.set(value);
        Ok(())
    }

    /// Increment by 1.
    pub fn inc(&self) -> Result<()> {
        self.add(1.0)
    }

    /// Decrement by 1.
    pub fn dec(&self) -> Result<()> {
        self.add(-1.0)
    }

    /// Add a signed delta.
    pub fn add(&self, delta: f64) -> Result<()> {
        self.stored()?.add(delta);
        Ok(())
    }

    pub fn sub(&self, delta: f64) -> Result<()> {
        self.add(-delta)
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.source, Source::Callback(_))
    }

    /// Current value. Callback gauges run their callback on every call.
    pub fn get(&self) -> f64 {
        match &self.source {
            Source::Stored(v) => v.get(),
            Source::Callback(cb) => cb(),
        }
    }
}

impl Metric for Gauge {
    const KIND: MetricKind = MetricKind::Gauge;
    /// Set only for unlabeled callback families.
    type Options = Option<GaugeCallback>;

    fn build(name: &Arc<str>, options: &Option<GaugeCallback>) -> Self {
        match options {
            Some(cb) => Self::from_callback(name, Arc::clone(cb)),
            None => Self {
                name: Arc::clone(name),
                source: Source::Stored(AtomicF64::new(0.0)),
            },
        }
    }

    fn collect(&self, name: &str, labels: &[(String, String)], out: &mut Vec<Sample>) {
        // A panicking callback costs its own sample, not the scrape.
        match catch_unwind(AssertUnwindSafe(|| self.get())) {
            Ok(value) => out.push(Sample::new(name, labels.to_vec(), value)),
            Err(_) => tracing::warn!(metric = %name, "gauge callback panicked; sample skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn stored_gauge_moves_both_ways() {
        let g = Gauge::build(&Arc::from("queue_depth"), &None);
        g.set(10.0).unwrap();
        g.inc().unwrap();
        g.dec().unwrap();
        g.dec().unwrap();
        g.add(-2.5).unwrap();
        g.sub(0.5).unwrap();
        assert_eq!(g.get(), 6.0);
    }

    #[test]
    fn callback_gauge_rejects_mutation() {
        let g = Gauge::from_callback(&Arc::from("pool_size"), Arc::new(|| 4.0));
        assert_eq!(g.set(1.0).unwrap_err().code().as_str(), "READ_ONLY_GAUGE");
        assert!(g.inc().is_err());
        assert!(g.dec().is_err());
        assert!(g.add(3.0).is_err());
        assert_eq!(g.get(), 4.0);
    }

    #[test]
    fn callback_is_evaluated_on_each_collect() {
        let hits = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&hits);
        let g = Gauge::from_callback(
            &Arc::from("hits"),
            Arc::new(move || seen.fetch_add(1, Ordering::SeqCst) as f64),
        );

        let mut out = Vec::new();
        g.collect("hits", &[], &mut out);
        g.collect("hits", &[], &mut out);
        assert_eq!(out[0].value, 0.0);
        assert_eq!(out[1].value, 1.0);
    }

    #[test]
    fn panicking_callback_skips_sample() {
        let g = Gauge::from_callback(&Arc::from("broken"), Arc::new(|| panic!("boom")));
        let mut out = Vec::new();
        g.collect("broken", &[], &mut out);
        assert!(out.is_empty());
    }
}
