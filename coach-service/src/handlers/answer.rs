use crate::handlers::{error_outcome, record_outcome};
use crate::models::{AnswerRequest, CoachResponse, Style, WhisperRequest, WhisperResponse};
use crate::services::coach::{CoachRequest, QuestionSource};
use crate::services::metrics;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::utils::AppJson;

/// `POST /api/answer`: answer a typed interview question.
pub async fn answer_question(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AnswerRequest>,
) -> Result<Json<CoachResponse>, AppError> {
    let request = CoachRequest {
        source: QuestionSource::Text(payload.question.unwrap_or_default()),
        device_id: payload.device_id,
        user_email: payload.user_email,
        context: payload.context,
        work_history: payload.work_history,
        style: Style::from_field(payload.style.as_deref()),
    };

    let result = state.coach.answer(request).await;
    record_outcome("answer", &result);
    result.map(Json)
}

/// `POST /api/whisper`: very short feedback on a live transcript chunk.
pub async fn live_feedback(
    State(state): State<AppState>,
    AppJson(payload): AppJson<WhisperRequest>,
) -> Result<Json<WhisperResponse>, AppError> {
    let chunk = payload.transcript_chunk.unwrap_or_default();

    match state.coach.live_feedback(&chunk).await {
        Ok(feedback) => {
            metrics::record_request("whisper", "answered");
            Ok(Json(WhisperResponse {
                feedback,
                chunk_received: chunk,
            }))
        }
        Err(e) => {
            metrics::record_request("whisper", error_outcome(&e));
            Err(e)
        }
    }
}
