#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use spotmetrics_core::{parse_text, Opts, Registry, TEXT_CONTENT_TYPE};
use spotmetrics_exporter::{app_state::AppState, config, ops, router};

fn state_with(registry: Arc<Registry>, process_metrics: bool) -> AppState {
    let mut cfg = config::ExporterConfig::default();
    cfg.exporter.process_metrics = process_metrics;
    AppState::new(cfg, registry).expect("state")
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let resp = ops::healthz().await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}

#[tokio::test]
async fn readyz_reports_draining() {
    let state = state_with(Arc::new(Registry::new()), false);

    let resp = ops::readyz(State(state.clone())).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ready");

    state.set_draining(true);
    let resp = ops::readyz(State(state)).await.into_response();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_string(resp).await, "draining");
}

#[tokio::test]
async fn metrics_serves_application_and_self_metrics() {
    let registry = Arc::new(Registry::new());
    registry
        .counter(Opts::new("jobs_total").help("Jobs run."))
        .unwrap()
        .inc_by(7.0)
        .unwrap();
    let state = state_with(Arc::clone(&registry), true);

    let resp = ops::metrics(State(state.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap(),
        TEXT_CONTENT_TYPE
    );
    let text = body_string(resp).await;
    assert!(text.contains("# TYPE jobs_total counter\njobs_total 7\n"));
    assert!(text.contains("# TYPE process_uptime_seconds gauge\n"));
    assert!(text.contains("# TYPE spotmetrics_scrape_duration_seconds histogram\n"));

    // The second scrape sees the first one recorded.
    let text = body_string(ops::metrics(State(state)).await).await;
    let samples = parse_text(&text).unwrap();
    let scrapes = samples
        .iter()
        .find(|s| s.name == "spotmetrics_scrapes_total" && s.label("outcome") == Some("ok"))
        .expect("scrape counter");
    assert_eq!(scrapes.value, 1.0);
    let observed = samples
        .iter()
        .find(|s| s.name == "spotmetrics_scrape_duration_seconds_count")
        .expect("duration count");
    assert_eq!(observed.value, 1.0);
}

#[tokio::test]
async fn draining_scrapes_are_counted_separately() {
    let registry = Arc::new(Registry::new());
    let state = state_with(Arc::clone(&registry), false);
    state.set_draining(true);

    let resp = ops::metrics(State(state)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let text = String::from_utf8(registry.render().to_vec()).unwrap();
    assert!(text.contains("spotmetrics_scrapes_total{outcome=\"draining\"} 1\n"));
    assert!(!text.contains("process_uptime_seconds"));
}

#[test]
fn self_metrics_collide_with_conflicting_application_metric() {
    let registry = Arc::new(Registry::new());
    registry.gauge(Opts::new("spotmetrics_scrapes_total")).unwrap();

    let cfg = config::ExporterConfig::default();
    let err = AppState::new(cfg, registry).err().expect("must fail");
    assert_eq!(err.code().as_str(), "METRIC_REDEFINITION");
}

#[test]
fn router_builds_for_accepted_metrics_paths() {
    for path in ["/metrics", "/internal/metrics", "/v1/prom-metrics"] {
        let yaml = format!("version: 1\nexporter:\n  metrics_path: \"{path}\"\n  process_metrics: false\n");
        let cfg = config::load_from_str(&yaml).expect("must parse");
        let state = AppState::new(cfg, Arc::new(Registry::new())).expect("state");
        let _router = router::build_router(state);
    }
}
