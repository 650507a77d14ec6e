//! Standalone exporter binary.
//!
//! Serves a registry holding the exporter and process metrics. Config comes from `SPOTMETRICS_CONFIG`
//! (default `spotmetrics.yaml`); a missing file means defaults.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use spotmetrics_core::{MetricsError, Registry, Result};
use spotmetrics_exporter::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "spotmetrics-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.exporter.listen_addr()?;

    let registry = Arc::new(Registry::new());
    let state = AppState::new(cfg, registry)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, metrics_path = %state.cfg().exporter.metrics_path, "spotmetrics-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricsError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| MetricsError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; shutting down");
    }
    state.set_draining(true);
    tracing::info!("draining; shutting down");
}
