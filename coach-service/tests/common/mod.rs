//! Shared helpers for coach-service integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use coach_service::config::{
    AuthConfig, CoachConfig, CorsConfig, LimitsConfig, ModelConfig, ProviderConfig,
};
use coach_service::services::providers::mock::{MockChatProvider, MockTranscriptionProvider};
use coach_service::startup::{router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-app-secret";
const BOUNDARY: &str = "coach-test-boundary";

pub fn test_config() -> CoachConfig {
    CoachConfig {
        common: service_core::config::Config { port: 0 },
        provider: ProviderConfig {
            api_key: "test-groq-key".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
        },
        models: ModelConfig {
            chat_model: "llama-3.1-8b-instant".to_string(),
            transcription_model: "whisper-large-v3".to_string(),
            temperature: 0.7,
            max_tokens: 300,
        },
        auth: AuthConfig { app_secret: None },
        limits: LimitsConfig {
            free_question_limit: 5,
            min_audio_bytes: 1000,
            max_upload_bytes: 25 * 1024 * 1024,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
    }
}

/// Router backed by mock providers, plus handles to inspect them.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub chat: MockChatProvider,
    pub stt: MockTranscriptionProvider,
}

impl TestApp {
    pub fn new(config: CoachConfig) -> Self {
        Self::with_providers(
            config,
            MockChatProvider::replying("  Lead with a concrete result.  "),
            MockTranscriptionProvider::replying("Tell me about a time you failed."),
        )
    }

    pub fn with_providers(
        config: CoachConfig,
        chat: MockChatProvider,
        stt: MockTranscriptionProvider,
    ) -> Self {
        let state = AppState::new(config, Arc::new(chat.clone()), Arc::new(stt.clone()));
        Self {
            router: router(state.clone()),
            state,
            chat,
            stt,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

pub fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_api_key(mut request: Request<Body>, key: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-api-key", key.parse().unwrap());
    request
}

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    },
}

pub fn audio_part(name: &str, len: usize) -> Part<'_> {
    Part::File {
        name,
        file_name: "clip.webm",
        content_type: "audio/webm",
        bytes: vec![0x1a; len],
    }
}

pub fn multipart_post(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
