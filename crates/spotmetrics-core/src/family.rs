//! Labeled metric families.
//!
//! A family owns the declared shape of one metric plus a concurrent map
//! `label values -> child`. Steady-state lookups only take a shard read lock;
//! the shard write lock is taken once per new label combination.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{MetricsError, Result};
use crate::metric::{Metric, MetricKind, Sample};

/// Declared shape of a family.
#[derive(Debug, Clone)]
pub struct Desc {
    pub name: Arc<str>,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
}

/// All children of one metric name.
pub struct Family<M: Metric> {
    desc: Desc,
    options: M::Options,
    children: DashMap<Vec<String>, Arc<M>>,
    /// Eager empty-tuple child of zero-label families.
    unlabeled: Option<Arc<M>>,
}

impl<M: Metric> Family<M> {
    pub(crate) fn new(desc: Desc, options: M::Options) -> Self {
        let children = DashMap::new();
        let unlabeled = if desc.label_names.is_empty() {
            let child = Arc::new(M::build(&desc.name, &options));
            children.insert(Vec::new(), Arc::clone(&child));
            Some(child)
        } else {
            None
        };
        Self {
            desc,
            options,
            children,
            unlabeled,
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    /// Number of materialized label combinations.
    pub fn cardinality(&self) -> usize {
        self.children.len()
    }

    /// Child for positional label values (in declared order).
    pub fn with_label_values(&self, values: &[&str]) -> Result<Arc<M>> {
        self.get_or_insert_with(values, || M::build(&self.desc.name, &self.options))
    }

    /// Child for a `name -> value` mapping; must name every declared label once.
    pub fn with(&self, labels: &[(&str, &str)]) -> Result<Arc<M>> {
        let values = self.resolve(labels)?;
        self.with_label_values(&values)
    }

    /// The empty-tuple child; `LabelArity` when the family declares labels.
    pub fn unlabeled(&self) -> Result<Arc<M>> {
        self.unlabeled.clone().ok_or_else(|| MetricsError::LabelArity {
            name: self.desc.name.to_string(),
            expected: self.desc.label_names.len(),
            got: 0,
        })
    }

    /// First writer wins: `make` only runs when the tuple is absent, and a
    /// losing racer's candidate is dropped in favour of the stored child.
    pub(crate) fn get_or_insert_with(
        &self,
        values: &[&str],
        make: impl FnOnce() -> M,
    ) -> Result<Arc<M>> {
        self.check_arity(values.len())?;
        if values.is_empty() {
            if let Some(child) = &self.unlabeled {
                return Ok(Arc::clone(child));
            }
        }

        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        if let Some(child) = self.children.get(&key) {
            return Ok(Arc::clone(child.value()));
        }

        let child = self.children.entry(key).or_insert_with(|| {
            tracing::debug!(metric = %self.desc.name, labels = ?values, "child created");
            Arc::new(make())
        });
        Ok(Arc::clone(child.value()))
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        let expected = self.desc.label_names.len();
        if got != expected {
            return Err(MetricsError::LabelArity {
                name: self.desc.name.to_string(),
                expected,
                got,
            });
        }
        Ok(())
    }

    fn resolve<'a>(&self, labels: &[(&str, &'a str)]) -> Result<Vec<&'a str>> {
        for (name, _) in labels {
            if !self.desc.label_names.iter().any(|n| n.as_str() == *name) {
                return Err(MetricsError::UnknownLabelName {
                    name: self.desc.name.to_string(),
                    label: name.to_string(),
                });
            }
        }
        self.check_arity(labels.len())?;

        self.desc
            .label_names
            .iter()
            .map(|declared| {
                labels
                    .iter()
                    .find(|(name, _)| *name == declared.as_str())
                    .map(|(_, value)| *value)
            })
            .collect::<Option<Vec<_>>>()
            // Right count but a name repeated, so one declared name is missing.
            .ok_or_else(|| MetricsError::LabelArity {
                name: self.desc.name.to_string(),
                expected: self.desc.label_names.len(),
                got: distinct_names(labels),
            })
    }

    /// Children sorted by label values. Shard locks are released before any
    /// child is read, so slow callbacks never hold up writers.
    pub(crate) fn collect(&self) -> Vec<Sample> {
        let mut children: Vec<(Vec<String>, Arc<M>)> = self
            .children
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::new();
        for (values, child) in children {
            let labels: Vec<(String, String)> = self
                .desc
                .label_names
                .iter()
                .cloned()
                .zip(values)
                .collect();
            child.collect(&self.desc.name, &labels, &mut out);
        }
        out
    }
}

fn distinct_names(labels: &[(&str, &str)]) -> usize {
    let mut names: Vec<&str> = labels.iter().map(|(n, _)| *n).collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}
