//! Outbound response envelopes.

use serde::Serialize;

/// Answer envelope shared by `/api/answer`, `/process` and `/process_audio`.
#[derive(Debug, Clone, Serialize)]
pub struct CoachResponse {
    pub answer: String,

    /// Present when the request carried audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    /// Wall-clock seconds spent handling the request.
    pub processing_time: f64,

    /// Present when the request was tied to a usage key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions_used: Option<u32>,
}

/// Response of `/api/whisper`.
#[derive(Debug, Clone, Serialize)]
pub struct WhisperResponse {
    pub feedback: String,
    pub chunk_received: String,
}

/// Response of `/save_email`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveEmailResponse {
    pub status: &'static str,
    pub questions_used: u32,
}
