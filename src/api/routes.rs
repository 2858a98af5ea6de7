//! HTTP API route definitions.

use axum::{
    routing::{any, get},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use super::handlers::{health, AppState};

/// Create the API router.
///
/// `/api/health` is mounted method-agnostic so the handler itself can
/// dispatch on `OPTIONS` versus everything else. The Prometheus handle
/// is optional so tests can build a router without a recorder.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new().route("/api/health", any(health));

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
