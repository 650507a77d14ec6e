//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use spotmetrics_core::error::{MetricsError, Result};

pub use schema::{ExporterConfig, ExporterSection};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "SPOTMETRICS_CONFIG";
/// Used when `SPOTMETRICS_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "spotmetrics.yaml";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path`, falling back to defaults when the file does not exist.
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &str) -> Result<ExporterConfig> {
    if !Path::new(path).exists() {
        tracing::info!(%path, "config file not found; using defaults");
        return Ok(ExporterConfig::default());
    }
    load_from_file(path)
}

/// Path from `SPOTMETRICS_CONFIG`, or the default.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
