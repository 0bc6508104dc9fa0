use crate::startup::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;
use service_core::utils::secrets_match;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose `x-api-key` does not equal the configured secret.
///
/// When no secret is configured every request passes.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.auth.app_secret.as_deref() else {
        return Ok(next.run(req).await);
    };

    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(presented) if secrets_match(expected, presented) => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "Rejected request with invalid API key");
            Err(AppError::Forbidden(anyhow::anyhow!("Invalid API key")))
        }
        None => {
            tracing::warn!(path = %req.uri().path(), "Rejected request without API key");
            Err(AppError::Forbidden(anyhow::anyhow!("Missing API key")))
        }
    }
}
