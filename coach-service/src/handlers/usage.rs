use crate::models::{SaveEmailRequest, SaveEmailResponse};
use crate::services::metrics;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::utils::ValidatedJson;

/// `POST /save_email`: attach an email to a device and carry its usage over.
pub async fn save_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SaveEmailRequest>,
) -> Result<Json<SaveEmailResponse>, AppError> {
    let questions_used = state
        .coach
        .usage()
        .migrate_to_email(&payload.device_id, &payload.user_email);

    tracing::info!(
        device_id = %payload.device_id.trim(),
        questions_used,
        "Linked email to device"
    );
    metrics::record_request("save_email", "answered");

    Ok(Json(SaveEmailResponse {
        status: "ok",
        questions_used,
    }))
}
