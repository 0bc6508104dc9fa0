//! AI provider abstractions and implementations.
//!
//! The coach talks to two hosted services: a chat-completion endpoint that
//! writes the answer and a speech-to-text endpoint that transcribes audio
//! uploads. Both sit behind traits so handlers can be exercised with mocks.

pub mod groq;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited by AI provider")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EmptyResponse => "empty_response",
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::UpstreamError(err.to_string())
    }
}

/// System + user message pair sent to the chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Sampling parameters for a chat completion.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
}

/// Result of a chat completion.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Message content exactly as returned; callers trim.
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: u32,

    /// Output tokens generated.
    pub output_tokens: u32,
}

/// Audio handed to a transcription provider.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Generate a single non-streaming completion.
    async fn complete(
        &self,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;
}

/// Trait for speech-to-text providers.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transcribe the clip and return the recognized text.
    async fn transcribe(&self, clip: AudioClip) -> Result<String, ProviderError>;
}
