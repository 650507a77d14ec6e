use std::sync::Arc;

use crate::error::{MetricsError, Result};

use super::{AtomicF64, Metric, MetricKind, Sample};

/// Monotonic accumulator.
#[derive(Debug)]
pub struct Counter {
    name: Arc<str>,
    value: AtomicF64,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self) {
        self.value.add(1.0);
    }

    /// Increment by `delta`. Negative (or NaN) deltas are rejected and leave
    /// the value untouched.
    pub fn inc_by(&self, delta: f64) -> Result<()> {
        if delta.is_nan() || delta < 0.0 {
            return Err(MetricsError::InvalidDelta {
                name: self.name.to_string(),
                delta,
            });
        }
        self.value.add(delta);
        Ok(())
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

impl Metric for Counter {
    const KIND: MetricKind = MetricKind::Counter;
    type Options = ();

    fn build(name: &Arc<str>, _options: &()) -> Self {
        Self {
            name: Arc::clone(name),
            value: AtomicF64::new(0.0),
        }
    }

    fn collect(&self, name: &str, labels: &[(String, String)], out: &mut Vec<Sample>) {
        out.push(Sample::new(name, labels.to_vec(), self.get()));
    }
}
