//! HTTP handlers for coach-service.

pub mod answer;
pub mod health;
pub mod process;
pub mod usage;

pub use answer::{answer_question, live_feedback};
pub use health::{health_check, metrics_endpoint, root};
pub use process::process_submission;
pub use usage::save_email;

use crate::models::CoachResponse;
use crate::services::{metrics, LISTENING_PLACEHOLDER};
use service_core::error::AppError;

/// Catch-all for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}

pub(crate) fn error_outcome(err: &AppError) -> &'static str {
    if err.status_code().is_server_error() {
        "failed"
    } else {
        "rejected"
    }
}

pub(crate) fn record_outcome(endpoint: &str, result: &Result<CoachResponse, AppError>) {
    let outcome = match result {
        Ok(response) if response.answer == LISTENING_PLACEHOLDER => "placeholder",
        Ok(_) => "answered",
        Err(e) => error_outcome(e),
    };
    metrics::record_request(endpoint, outcome);
}
