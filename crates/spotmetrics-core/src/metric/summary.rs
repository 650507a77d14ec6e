use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{MetricsError, Result};
use crate::exposition::format_value;
use crate::quantile::QuantileEstimator;

use super::{with_extra_label, AtomicF64, Metric, MetricKind, Sample};

/// One tracked quantile and its absolute rank error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Objective {
    pub quantile: f64,
    pub error: f64,
}

impl Objective {
    pub const fn new(quantile: f64, error: f64) -> Self {
        Self { quantile, error }
    }
}

/// Objectives used when a summary is declared without explicit ones.
pub const DEFAULT_OBJECTIVES: [Objective; 3] = [
    Objective::new(0.5, 0.05),
    Objective::new(0.9, 0.01),
    Objective::new(0.99, 0.001),
];

pub(crate) fn validate_objectives(objectives: &[Objective]) -> Result<()> {
    for o in objectives {
        if !(o.quantile > 0.0 && o.quantile < 1.0) {
            return Err(MetricsError::InvalidMetric(format!(
                "quantile {} must lie in (0, 1)",
                o.quantile
            )));
        }
        // Zero error would keep every observation as its own marker.
        if !(o.error > 0.0 && o.error < 1.0) {
            return Err(MetricsError::InvalidMetric(format!(
                "quantile error {} must lie in (0, 1)",
                o.error
            )));
        }
    }
    Ok(())
}

/// Per-family summary settings.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub(crate) objectives: Arc<[Objective]>,
    /// `None` keeps every observation; `Some` rotates estimators.
    pub(crate) max_age: Option<Duration>,
}

struct Window {
    current: Vec<QuantileEstimator>,
    previous: Option<Vec<QuantileEstimator>>,
    max_age: Option<Duration>,
    rotate_at: Option<Instant>,
}

impl Window {
    fn new(objectives: &[Objective], max_age: Option<Duration>, now: Instant) -> Self {
        Self {
            current: fresh(objectives),
            previous: None,
            max_age,
            rotate_at: max_age.map(|age| now + age),
        }
    }

    fn rotate(&mut self, now: Instant) {
        let (Some(max_age), Some(rotate_at)) = (self.max_age, self.rotate_at) else {
            return;
        };
        if now < rotate_at {
            return;
        }
        let objectives: Vec<Objective> = self.current.iter().map(|e| e.objective()).collect();
        if now >= rotate_at + max_age {
            // Idle for more than a full window: nothing recent to keep.
            self.previous = None;
            self.current = fresh(&objectives);
            self.rotate_at = Some(now + max_age);
        } else {
            self.previous = Some(std::mem::replace(&mut self.current, fresh(&objectives)));
            self.rotate_at = Some(rotate_at + max_age);
        }
    }

    fn insert(&mut self, value: f64) {
        for e in &mut self.current {
            e.insert(value);
        }
    }

    fn query(&mut self) -> Vec<(f64, f64)> {
        match &self.previous {
            None => self
                .current
                .iter_mut()
                .map(|e| (e.objective().quantile, e.query()))
                .collect(),
            Some(previous) => previous
                .iter()
                .zip(&self.current)
                .map(|(old, new)| {
                    let mut both = QuantileEstimator::merged(old, new);
                    (both.objective().quantile, both.query())
                })
                .collect(),
        }
    }
}

fn fresh(objectives: &[Objective]) -> Vec<QuantileEstimator> {
    objectives.iter().copied().map(QuantileEstimator::new).collect()
}

/// Exact count and sum plus estimated quantiles.
pub struct Summary {
    count: AtomicU64,
    sum: AtomicF64,
    window: Mutex<Window>,
}

impl std::fmt::Debug for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summary")
            .field("count", &self.count())
            .field("sum", &self.sum())
            .finish()
    }
}

impl Summary {
    pub fn observe(&self, value: f64) {
        self.observe_at(value, Instant::now());
    }

    pub(crate) fn observe_at(&self, value: f64, now: Instant) {
        {
            let mut window = self.window.lock();
            window.rotate(now);
            window.insert(value);
        }
        self.sum.add(value);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    /// `(quantile, estimate)` per objective, in declaration order.
    pub fn quantiles(&self) -> Vec<(f64, f64)> {
        self.quantiles_at(Instant::now())
    }

    pub(crate) fn quantiles_at(&self, now: Instant) -> Vec<(f64, f64)> {
        let mut window = self.window.lock();
        window.rotate(now);
        window.query()
    }
}

impl Metric for Summary {
    const KIND: MetricKind = MetricKind::Summary;
    type Options = SummaryOptions;

    fn build(_name: &Arc<str>, options: &SummaryOptions) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
            window: Mutex::new(Window::new(
                &options.objectives,
                options.max_age,
                Instant::now(),
            )),
        }
    }

    fn collect(&self, name: &str, labels: &[(String, String)], out: &mut Vec<Sample>) {
        for (quantile, value) in self.quantiles() {
            out.push(Sample::new(
                name,
                with_extra_label(labels, "quantile", format_value(quantile)),
                value,
            ));
        }
        out.push(Sample::new(format!("{name}_sum"), labels.to_vec(), self.sum()));
        out.push(Sample::new(
            format!("{name}_count"),
            labels.to_vec(),
            self.count() as f64,
        ));
    }
}
