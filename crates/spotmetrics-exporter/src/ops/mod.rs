//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - metrics path : text exposition format

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use spotmetrics_core::TEXT_CONTENT_TYPE;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

/// Collect and encode the registry.
///
/// Scrapes keep being served while draining so the final values can still
/// be read; only the outcome label differs.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let body = state.registry().render();

    let recorded = if state.is_draining() {
        state.metrics().observe_draining()
    } else {
        state.metrics().observe_scrape(started.elapsed(), body.len())
    };
    if let Err(e) = recorded {
        tracing::warn!(error = %e, code = e.code().as_str(), "scrape self-metrics not recorded");
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
        body,
    )
        .into_response()
}
