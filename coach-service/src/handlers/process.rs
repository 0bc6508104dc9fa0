use crate::handlers::record_outcome;
use crate::models::{CoachResponse, ProcessSubmission, Style, UploadedAudio};
use crate::services::coach::{CoachRequest, QuestionSource};
use crate::services::providers::AudioClip;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use service_core::error::AppError;

const DEFAULT_AUDIO_FILE_NAME: &str = "audio.webm";
const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/webm";

/// `POST /process` and `POST /process_audio`: multipart audio clip or question.
pub async fn process_submission(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CoachResponse>, AppError> {
    let result = match read_submission(&mut multipart).await {
        Ok(submission) => match into_coach_request(submission) {
            Ok(request) => state.coach.answer(request).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    record_outcome("process", &result);
    result.map(Json)
}

async fn read_submission(multipart: &mut Multipart) -> Result<ProcessSubmission, AppError> {
    let mut submission = ProcessSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if ProcessSubmission::is_audio_field(&name) {
            if submission.audio.is_some() {
                tracing::debug!(field = %name, "Ignoring additional audio part");
                continue;
            }

            let file_name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_AUDIO_FILE_NAME)
                .to_string();
            let content_type = field
                .content_type()
                .filter(|ct| *ct != "application/octet-stream")
                .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
                .to_string();
            let bytes = field.bytes().await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read audio bytes: {}", e))
            })?;

            submission.audio = Some(UploadedAudio {
                bytes: bytes.to_vec(),
                file_name,
                content_type,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read field '{}': {}", name, e))
            })?;

            if !submission.set_text_field(&name, value) {
                tracing::debug!(field = %name, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(submission)
}

fn into_coach_request(submission: ProcessSubmission) -> Result<CoachRequest, AppError> {
    let source = match (submission.audio, submission.question) {
        (Some(audio), _) => {
            tracing::debug!(
                audio_bytes = audio.len(),
                content_type = %audio.content_type,
                "Received audio submission"
            );
            QuestionSource::Audio(AudioClip {
                bytes: audio.bytes,
                file_name: audio.file_name,
                content_type: audio.content_type,
            })
        }
        (None, Some(question)) if !question.trim().is_empty() => QuestionSource::Text(question),
        (None, _) => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Either an audio file or a question is required"
            )));
        }
    };

    Ok(CoachRequest {
        source,
        device_id: submission.device_id,
        user_email: submission.user_email,
        context: submission.context,
        work_history: submission.work_history,
        style: Style::from_field(submission.style.as_deref()),
    })
}
