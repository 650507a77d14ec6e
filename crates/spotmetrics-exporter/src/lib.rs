//! spotmetrics exporter: serves a [`Registry`](spotmetrics_core::Registry)
//! over HTTP for Prometheus-style scrapers.
//!
//! Exposes:
//! - `GET /healthz` (liveness)
//! - `GET /readyz` (readiness, 503 while draining)
//! - `GET <metrics_path>` (text exposition, `/metrics` by default)

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
