use crate::services::metrics::get_metrics;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe for Docker/K8s.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "coach-service",
        "version": env!("CARGO_PKG_VERSION"),
        "message": "API is online and ready for production"
    }))
}

/// `GET /`: same payload as `/health`.
pub async fn root() -> impl IntoResponse {
    health_check().await
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        get_metrics(),
    )
}
