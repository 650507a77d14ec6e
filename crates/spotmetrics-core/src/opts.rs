//! Declaration options for create-or-fetch calls.

use std::time::Duration;

use crate::error::{MetricsError, Result};
use crate::metric::{MetricKind, Objective};

/// Name, help text and label names shared by every metric type.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl Opts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn labels(mut self, names: &[&str]) -> Self {
        self.label_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub(crate) fn validate(&self, kind: MetricKind) -> Result<()> {
        if !is_valid_metric_name(&self.name) {
            return Err(MetricsError::InvalidMetric(format!(
                "invalid metric name {:?}",
                self.name
            )));
        }
        for (i, label) in self.label_names.iter().enumerate() {
            if !is_valid_label_name(label) {
                return Err(MetricsError::InvalidMetric(format!(
                    "metric {}: invalid label name {label:?}",
                    self.name
                )));
            }
            let reserved = match kind {
                MetricKind::Histogram => label == "le",
                MetricKind::Summary => label == "quantile",
                _ => false,
            };
            if reserved {
                return Err(MetricsError::InvalidMetric(format!(
                    "metric {}: label {label:?} is reserved for {} samples",
                    self.name,
                    kind.as_str()
                )));
            }
            if self.label_names[..i].contains(label) {
                return Err(MetricsError::InvalidMetric(format!(
                    "metric {}: duplicate label name {label:?}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Histogram declaration. `buckets: None` selects [`crate::DEFAULT_BUCKETS`].
#[derive(Debug, Clone, Default)]
pub struct HistogramOpts {
    pub common: Opts,
    pub buckets: Option<Vec<f64>>,
}

impl HistogramOpts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Opts::new(name),
            buckets: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.common = self.common.help(help);
        self
    }

    pub fn labels(mut self, names: &[&str]) -> Self {
        self.common = self.common.labels(names);
        self
    }

    pub fn buckets(mut self, bounds: Vec<f64>) -> Self {
        self.buckets = Some(bounds);
        self
    }
}

/// Summary declaration.
///
/// `objectives: None` selects [`crate::DEFAULT_OBJECTIVES`]; an explicit empty
/// list tracks only `_sum` and `_count`. `max_age` switches from cumulative
/// estimation to a rolling window.
#[derive(Debug, Clone, Default)]
pub struct SummaryOpts {
    pub common: Opts,
    pub objectives: Option<Vec<Objective>>,
    pub max_age: Option<Duration>,
}

impl SummaryOpts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Opts::new(name),
            objectives: None,
            max_age: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.common = self.common.help(help);
        self
    }

    pub fn labels(mut self, names: &[&str]) -> Self {
        self.common = self.common.labels(names);
        self
    }

    /// `(quantile, error)` pairs.
    pub fn objectives(mut self, pairs: &[(f64, f64)]) -> Self {
        self.objectives = Some(pairs.iter().map(|&(q, e)| Objective::new(q, e)).collect());
        self
    }

    pub fn max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, without the reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
