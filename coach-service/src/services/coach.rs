//! Request pipeline shared by every answering endpoint.
//!
//! validate -> reserve quota -> (transcribe) -> prompt -> chat -> envelope

use crate::models::{CoachResponse, Style, UsageKey};
use crate::services::metrics;
use crate::services::prompt::{build_prompt, live_feedback_prompt, PromptInput};
use crate::services::providers::{
    AudioClip, ChatProvider, GenerationParams, Prompt, ProviderError, TranscriptionProvider,
};
use crate::services::usage::UsageTracker;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Answer returned for audio that is too short to hold speech.
pub const LISTENING_PLACEHOLDER: &str = "Listening...";

/// Quota and audio thresholds.
#[derive(Debug, Clone, Copy)]
pub struct CoachLimits {
    /// Zero disables the quota.
    pub free_question_limit: u32,
    pub min_audio_bytes: usize,
}

/// What the client asked.
#[derive(Debug, Clone)]
pub enum QuestionSource {
    Text(String),
    Audio(AudioClip),
}

/// A normalized coaching request, independent of the transport it came in on.
#[derive(Debug, Clone)]
pub struct CoachRequest {
    pub source: QuestionSource,
    pub device_id: Option<String>,
    pub user_email: Option<String>,
    pub context: Option<String>,
    pub work_history: Option<String>,
    pub style: Style,
}

impl CoachRequest {
    /// Usage key, when the request identifies a device.
    pub fn usage_key(&self) -> Option<UsageKey> {
        self.device_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|device_id| UsageKey::for_request(device_id, self.user_email.as_deref()))
    }
}

#[derive(Clone)]
pub struct Coach {
    chat: Arc<dyn ChatProvider>,
    transcriber: Arc<dyn TranscriptionProvider>,
    usage: UsageTracker,
    params: GenerationParams,
    limits: CoachLimits,
}

fn elapsed_secs(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

impl Coach {
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        transcriber: Arc<dyn TranscriptionProvider>,
        usage: UsageTracker,
        params: GenerationParams,
        limits: CoachLimits,
    ) -> Self {
        Self {
            chat,
            transcriber,
            usage,
            params,
            limits,
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn limits(&self) -> CoachLimits {
        self.limits
    }

    /// Run one coaching request end to end.
    pub async fn answer(&self, request: CoachRequest) -> Result<CoachResponse, AppError> {
        let started = Instant::now();
        let key = request.usage_key();

        match &request.source {
            QuestionSource::Text(question) if question.trim().is_empty() => {
                return Err(AppError::BadRequest(anyhow::anyhow!("Question is required")));
            }
            QuestionSource::Audio(clip) if clip.bytes.len() < self.limits.min_audio_bytes => {
                tracing::debug!(
                    audio_bytes = clip.bytes.len(),
                    min_audio_bytes = self.limits.min_audio_bytes,
                    "Audio below minimum size, returning placeholder"
                );
                return Ok(self.placeholder(started, key.as_ref(), Some(String::new())));
            }
            _ => {}
        }

        let reservation = match &key {
            Some(key) => Some(
                self.usage
                    .reserve(key, self.limits.free_question_limit)
                    .map_err(|limit| {
                        metrics::record_quota_rejection();
                        tracing::info!(
                            usage_key = %key,
                            used = limit.used,
                            limit = limit.limit,
                            "Free question limit reached"
                        );
                        AppError::TooManyRequests(
                            format!(
                                "Free question limit reached ({} of {} used). \
                                 Please upgrade to continue.",
                                limit.used, limit.limit
                            ),
                            None,
                        )
                    })?,
            ),
            None => None,
        };

        let (question, transcript) = match request.source {
            QuestionSource::Text(question) => (question.trim().to_string(), None),
            QuestionSource::Audio(clip) => {
                let transcript = self.transcribe(clip).await?;
                let transcript = transcript.trim().to_string();
                if transcript.is_empty() {
                    drop(reservation);
                    return Ok(self.placeholder(started, key.as_ref(), Some(transcript)));
                }
                (transcript.clone(), Some(transcript))
            }
        };

        let prompt = build_prompt(PromptInput {
            question: &question,
            context: request.context.as_deref(),
            work_history: request.work_history.as_deref(),
            style: request.style,
        });

        let answer = self.complete(&prompt).await?;
        let questions_used = reservation.map(|r| r.commit());

        let processing_time = elapsed_secs(started);
        tracing::info!(
            usage_key = ?key.as_ref().map(UsageKey::as_str),
            style = %request.style,
            transcribed = transcript.is_some(),
            questions_used = ?questions_used,
            processing_time,
            "Answer generated"
        );

        Ok(CoachResponse {
            answer,
            transcript,
            processing_time,
            questions_used,
        })
    }

    /// Ten-word live feedback on a chunk of spoken transcript.
    ///
    /// Only an empty chunk is rejected; whitespace is forwarded as spoken.
    pub async fn live_feedback(&self, transcript_chunk: &str) -> Result<String, AppError> {
        if transcript_chunk.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Transcript chunk is empty"
            )));
        }

        self.complete(&live_feedback_prompt(transcript_chunk)).await
    }

    fn placeholder(
        &self,
        started: Instant,
        key: Option<&UsageKey>,
        transcript: Option<String>,
    ) -> CoachResponse {
        CoachResponse {
            answer: LISTENING_PLACEHOLDER.to_string(),
            transcript,
            processing_time: elapsed_secs(started),
            questions_used: key.map(|k| self.usage.usage(k)),
        }
    }

    async fn transcribe(&self, clip: AudioClip) -> Result<String, AppError> {
        let provider = self.transcriber.name();
        let started = Instant::now();
        let result = self.transcriber.transcribe(clip).await;
        metrics::record_provider_latency(provider, "transcribe", started.elapsed().as_secs_f64());

        result.map_err(|e| provider_failure(provider, "transcribe", e))
    }

    /// Chat completion, trimmed of surrounding whitespace.
    async fn complete(&self, prompt: &Prompt) -> Result<String, AppError> {
        let provider = self.chat.name();
        let started = Instant::now();
        let result = self.chat.complete(prompt, &self.params).await;
        metrics::record_provider_latency(provider, "chat", started.elapsed().as_secs_f64());

        let response = result.map_err(|e| provider_failure(provider, "chat", e))?;
        tracing::debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Chat completion finished"
        );

        Ok(response.text.trim().to_string())
    }
}

fn provider_failure(provider: &str, operation: &str, err: ProviderError) -> AppError {
    metrics::record_provider_error(provider, err.kind());
    tracing::error!(provider, operation, error = %err, "AI provider call failed");
    AppError::from(err)
}
