//! Groq provider implementation.
//!
//! Groq exposes OpenAI-compatible endpoints, so the same client serves both
//! chat completions and Whisper transcription.

use super::{
    AudioClip, ChatProvider, GenerationParams, Prompt, ProviderError, ProviderResponse,
    TranscriptionProvider,
};
use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Groq provider configuration.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    /// API root, e.g. `https://api.groq.com/openai/v1`.
    pub api_base: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub timeout: Duration,
}

/// Groq chat + transcription client.
pub struct GroqClient {
    config: GroqConfig,
    client: Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured("Groq API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Map a non-success HTTP status to a provider error, keeping the body for context.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderError::RateLimited;
        }

        let message = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
            .map(|e| e.error.message)
            .unwrap_or(error_text);

        if status == StatusCode::BAD_REQUEST {
            return ProviderError::InvalidRequest(message);
        }

        ProviderError::ApiError(format!("Groq API error {}: {}", status, message))
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        tracing::debug!(
            model = %self.config.chat_model,
            prompt_len = prompt.user.len(),
            "Sending chat completion request to Groq"
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse)?;

        let usage = api_response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
    }
}

#[async_trait]
impl TranscriptionProvider for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn transcribe(&self, clip: AudioClip) -> Result<String, ProviderError> {
        let audio_bytes = clip.bytes.len();

        let file_part = multipart::Part::bytes(clip.bytes)
            .file_name(clip.file_name)
            .mime_str(&clip.content_type)
            .map_err(|e| {
                ProviderError::InvalidRequest(format!("Invalid audio content type: {}", e))
            })?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.config.transcription_model.clone())
            .text("response_format", "json");

        tracing::debug!(
            model = %self.config.transcription_model,
            audio_bytes,
            "Sending transcription request to Groq"
        );

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(transcription.text)
    }
}

// ============================================================================
// OpenAI-compatible wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
