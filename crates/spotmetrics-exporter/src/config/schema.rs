use std::net::SocketAddr;

use serde::Deserialize;
use spotmetrics_core::error::{MetricsError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }

        self.exporter.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Register process start time / uptime callback gauges.
    #[serde(default = "default_process_metrics")]
    pub process_metrics: bool,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
            process_metrics: default_process_metrics(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.metrics_path.starts_with('/') || self.metrics_path.len() < 2 {
            return Err(MetricsError::InvalidConfig(
                "exporter.metrics_path must start with '/' and name a route".into(),
            ));
        }
        // Capture, wildcard and empty segments are not plain routes.
        if self
            .metrics_path
            .split('/')
            .skip(1)
            .any(|seg| seg.is_empty() || seg.starts_with(':') || seg.starts_with('*'))
        {
            return Err(MetricsError::InvalidConfig(format!(
                "exporter.metrics_path {:?} must be a plain path without empty, ':' or '*' segments",
                self.metrics_path
            )));
        }
        if matches!(self.metrics_path.as_str(), "/healthz" | "/readyz") {
            return Err(MetricsError::InvalidConfig(
                "exporter.metrics_path collides with an ops route".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            MetricsError::InvalidConfig(format!(
                "exporter.listen must be a valid SocketAddr (got {:?})",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:9464".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_process_metrics() -> bool {
    true
}
