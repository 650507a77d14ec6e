//! Typed handles returned by the create-or-fetch calls.
//!
//! A handle is a cheap clone of the family `Arc`. Unlabeled operations go to
//! the eager empty-tuple child; labeled ones select a child first with
//! [`MetricVec::with_label_values`] or [`MetricVec::with`]. Hot call sites can
//! keep the returned child `Arc` and skip the lookup entirely.

use std::sync::Arc;

use crate::error::{MetricsError, Result};
use crate::family::Family;
use crate::metric::{Counter, Gauge, GaugeCallback, Histogram, Metric, Summary};

pub struct MetricVec<M: Metric> {
    family: Arc<Family<M>>,
}

pub type CounterVec = MetricVec<Counter>;
pub type GaugeVec = MetricVec<Gauge>;
pub type HistogramVec = MetricVec<Histogram>;
pub type SummaryVec = MetricVec<Summary>;

impl<M: Metric> Clone for MetricVec<M> {
    fn clone(&self) -> Self {
        Self {
            family: Arc::clone(&self.family),
        }
    }
}

impl<M: Metric> MetricVec<M> {
    pub(crate) fn new(family: Arc<Family<M>>) -> Self {
        Self { family }
    }

    pub fn family(&self) -> &Arc<Family<M>> {
        &self.family
    }

    /// True when both handles point at the same registered family.
    pub fn same_family(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
    }

    pub fn with_label_values(&self, values: &[&str]) -> Result<Arc<M>> {
        self.family.with_label_values(values)
    }

    pub fn with(&self, labels: &[(&str, &str)]) -> Result<Arc<M>> {
        self.family.with(labels)
    }

    fn unlabeled(&self) -> Result<Arc<M>> {
        self.family.unlabeled()
    }
}

impl CounterVec {
    pub fn inc(&self) -> Result<()> {
        self.unlabeled()?.inc();
        Ok(())
    }

    pub fn inc_by(&self, delta: f64) -> Result<()> {
        self.unlabeled()?.inc_by(delta)
    }

    pub fn get(&self) -> Result<f64> {
        Ok(self.unlabeled()?.get())
    }
}

impl GaugeVec {
    pub fn set(&self, value: f64) -> Result<()> {
        self.unlabeled()?.set(value)
    }

    pub fn inc(&self) -> Result<()> {
        self.unlabeled()?.inc()
    }

    pub fn dec(&self) -> Result<()> {
        self.unlabeled()?.dec()
    }

    pub fn add(&self, delta: f64) -> Result<()> {
        self.unlabeled()?.add(delta)
    }

    pub fn sub(&self, delta: f64) -> Result<()> {
        self.unlabeled()?.sub(delta)
    }

    pub fn get(&self) -> Result<f64> {
        Ok(self.unlabeled()?.get())
    }

    /// Install a callback-backed child for `values`.
    ///
    /// Idempotent: an existing callback child is returned as is (its original
    /// callback stays). A stored-mode child already occupying the tuple is a
    /// redefinition.
    pub fn with_callback<F>(&self, values: &[&str], callback: F) -> Result<Arc<Gauge>>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        let name = Arc::clone(&self.family.desc().name);
        let cb: GaugeCallback = Arc::new(callback);
        let child = self
            .family
            .get_or_insert_with(values, || Gauge::from_callback(&name, cb))?;
        if !child.is_callback() {
            return Err(MetricsError::Redefinition {
                name: name.to_string(),
                detail: format!("child {values:?} already holds a stored value"),
            });
        }
        Ok(child)
    }
}

impl HistogramVec {
    pub fn observe(&self, value: f64) -> Result<()> {
        self.unlabeled()?.observe(value);
        Ok(())
    }
}

impl SummaryVec {
    pub fn observe(&self, value: f64) -> Result<()> {
        self.unlabeled()?.observe(value);
        Ok(())
    }
}
