use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{MetricsError, Result};
use crate::exposition::format_value;

use super::{with_extra_label, AtomicF64, Metric, MetricKind, Sample};

/// Bounds used when a histogram is declared without explicit buckets.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// `count` bounds starting at `start`, each `width` apart.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Result<Vec<f64>> {
    if count == 0 || !(width > 0.0) || !start.is_finite() {
        return Err(MetricsError::InvalidMetric(format!(
            "linear buckets need count >= 1 and width > 0 (start={start}, width={width}, count={count})"
        )));
    }
    Ok((0..count).map(|i| start + width * i as f64).collect())
}

/// `count` bounds starting at `start`, each `factor` times the previous.
pub fn exponential_buckets(start: f64, factor: f64, count: usize) -> Result<Vec<f64>> {
    if count == 0 || !(start > 0.0) || !(factor > 1.0) {
        return Err(MetricsError::InvalidMetric(format!(
            "exponential buckets need count >= 1, start > 0 and factor > 1 (start={start}, factor={factor}, count={count})"
        )));
    }
    let mut bounds = Vec::with_capacity(count);
    let mut next = start;
    for _ in 0..count {
        bounds.push(next);
        next *= factor;
    }
    Ok(bounds)
}

/// Sort, reject NaN/duplicates, and terminate with +Inf.
pub(crate) fn normalize_buckets(mut bounds: Vec<f64>) -> Result<Arc<[f64]>> {
    if bounds.iter().any(|b| b.is_nan()) {
        return Err(MetricsError::InvalidMetric("bucket bound is NaN".into()));
    }
    bounds.sort_by(f64::total_cmp);
    if bounds.windows(2).any(|w| w[0] == w[1]) {
        return Err(MetricsError::InvalidMetric("duplicate bucket bound".into()));
    }
    if bounds.last() != Some(&f64::INFINITY) {
        bounds.push(f64::INFINITY);
    }
    Ok(bounds.into())
}

/// Point-in-time view of one histogram child.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)`, ascending, last bound is +Inf.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

/// Fixed-bucket distribution.
///
/// Each observation bumps exactly one per-bucket slot; cumulative counts and
/// the total are derived from the same slot snapshot at collection time, so the
/// `+Inf` bucket always agrees with `_count`.
#[derive(Debug)]
pub struct Histogram {
    upper_bounds: Arc<[f64]>,
    slots: Box<[AtomicU64]>,
    sum: AtomicF64,
}

impl Histogram {
    pub fn observe(&self, value: f64) {
        let idx = if value.is_nan() {
            self.upper_bounds.len() - 1
        } else {
            self.upper_bounds.partition_point(|b| *b < value)
        };
        if let Some(slot) = self.slots.get(idx) {
            slot.fetch_add(1, Ordering::Relaxed);
        }
        self.sum.add(value);
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut cumulative = 0u64;
        let buckets = self
            .upper_bounds
            .iter()
            .zip(self.slots.iter())
            .map(|(bound, slot)| {
                cumulative += slot.load(Ordering::Relaxed);
                (*bound, cumulative)
            })
            .collect();
        HistogramSnapshot {
            buckets,
            sum: self.sum.get(),
            count: cumulative,
        }
    }
}

impl Metric for Histogram {
    const KIND: MetricKind = MetricKind::Histogram;
    type Options = Arc<[f64]>;

    fn build(_name: &Arc<str>, bounds: &Arc<[f64]>) -> Self {
        Self {
            upper_bounds: Arc::clone(bounds),
            slots: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            sum: AtomicF64::new(0.0),
        }
    }

    fn collect(&self, name: &str, labels: &[(String, String)], out: &mut Vec<Sample>) {
        let snap = self.snapshot();
        let bucket_name = format!("{name}_bucket");
        for (bound, count) in snap.buckets {
            out.push(Sample::new(
                bucket_name.as_str(),
                with_extra_label(labels, "le", format_value(bound)),
                count as f64,
            ));
        }
        out.push(Sample::new(format!("{name}_sum"), labels.to_vec(), snap.sum));
        out.push(Sample::new(
            format!("{name}_count"),
            labels.to_vec(),
            snap.count as f64,
        ));
    }
}
