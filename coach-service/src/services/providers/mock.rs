//! Mock provider implementations for testing.

use super::{
    AudioClip, ChatProvider, GenerationParams, Prompt, ProviderError, ProviderResponse,
    TranscriptionProvider,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Canned outcome for a mock call.
#[derive(Debug, Clone)]
enum MockOutcome {
    Reply(String),
    Fail(String),
}

/// Mock chat provider that returns a fixed reply and records every prompt.
#[derive(Clone)]
pub struct MockChatProvider {
    outcome: MockOutcome,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockChatProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Reply(text.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails with [`ProviderError::ApiError`] carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Fail(message.into()),
            ..Self::replying("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        match &self.outcome {
            MockOutcome::Reply(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: (prompt.system.len() + prompt.user.len()) as u32 / 4,
                output_tokens: text.len() as u32 / 4,
            }),
            MockOutcome::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}

/// Mock transcription provider that returns a fixed transcript.
#[derive(Clone)]
pub struct MockTranscriptionProvider {
    outcome: MockOutcome,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriptionProvider {
    pub fn replying(transcript: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Reply(transcript.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Fail(message.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionProvider for MockTranscriptionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn transcribe(&self, _clip: AudioClip) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            MockOutcome::Reply(text) => Ok(text.clone()),
            MockOutcome::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}
