//! Shared error type across spotmetrics crates.

use thiserror::Error;

/// Stable error codes (safe to match on or log).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Same name re-declared with a conflicting shape.
    MetricRedefinition,
    /// Wrong number of label values.
    LabelArity,
    /// Negative or NaN counter increment.
    InvalidDelta,
    /// Mutation on a callback-backed gauge.
    ReadOnlyGauge,
    /// Label mapping names an undeclared label.
    UnknownLabelName,
    /// Bad metric/label name, buckets or objectives.
    InvalidMetric,
    /// Exposition text could not be parsed.
    InvalidExposition,
    /// Config file rejected.
    InvalidConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MetricRedefinition => "METRIC_REDEFINITION",
            ErrorCode::LabelArity => "LABEL_ARITY",
            ErrorCode::InvalidDelta => "INVALID_DELTA",
            ErrorCode::ReadOnlyGauge => "READ_ONLY_GAUGE",
            ErrorCode::UnknownLabelName => "UNKNOWN_LABEL_NAME",
            ErrorCode::InvalidMetric => "INVALID_METRIC",
            ErrorCode::InvalidExposition => "INVALID_EXPOSITION",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by the core and the exporter.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric {name} redefined: {detail}")]
    Redefinition { name: String, detail: String },
    #[error("metric {name} expects {expected} label values, got {got}")]
    LabelArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("counter {name} cannot be incremented by {delta}")]
    InvalidDelta { name: String, delta: f64 },
    #[error("gauge {name} is backed by a callback and cannot be mutated")]
    ReadOnlyGauge { name: String },
    #[error("metric {name} has no label named {label}")]
    UnknownLabelName { name: String, label: String },
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("invalid exposition line {line}: {reason}")]
    InvalidExposition { line: usize, reason: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::Redefinition { .. } => ErrorCode::MetricRedefinition,
            MetricsError::LabelArity { .. } => ErrorCode::LabelArity,
            MetricsError::InvalidDelta { .. } => ErrorCode::InvalidDelta,
            MetricsError::ReadOnlyGauge { .. } => ErrorCode::ReadOnlyGauge,
            MetricsError::UnknownLabelName { .. } => ErrorCode::UnknownLabelName,
            MetricsError::InvalidMetric(_) => ErrorCode::InvalidMetric,
            MetricsError::InvalidExposition { .. } => ErrorCode::InvalidExposition,
            MetricsError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            MetricsError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            MetricsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
