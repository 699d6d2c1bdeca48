use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use county_atlas::atlas::{atlas_router, AtlasSession, DatasetStatus};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_atlas_routes(session: Arc<AtlasSession>) -> axum::Router {
    atlas_router(session)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the listener is bound and both datasets have loaded.
pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let bound = state.readiness.load(std::sync::atomic::Ordering::Relaxed);

    let (status, payload) = match (bound, state.session.status()) {
        (true, DatasetStatus::Ready) => (StatusCode::OK, json!({ "status": "ready" })),
        (_, DatasetStatus::Failed(detail)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "status": "failed", "detail": detail }),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "status": "initializing" }),
        ),
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
