//! Shared state handed to every request handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spotmetrics_core::{Registry, Result};

use crate::config::ExporterConfig;
use crate::obs::{process::register_process_metrics, ExporterMetrics};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Arc<Registry>,
    metrics: ExporterMetrics,
    draining: AtomicBool,
}

impl AppState {
    /// Build state around `registry`, registering the exporter's own metrics in it.
    /// Returns Result so a conflicting name in the application's registry
    /// fails startup instead of panicking.
    pub fn new(cfg: ExporterConfig, registry: Arc<Registry>) -> Result<Self> {
        let metrics = ExporterMetrics::register(&registry)?;
        if cfg.exporter.process_metrics {
            register_process_metrics(&registry)?;
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
                draining: AtomicBool::new(false),
            }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self, draining: bool) {
        self.inner.draining.store(draining, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
