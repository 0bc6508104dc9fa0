//! HTTP-level tests of the Groq client against a wiremock server.

use coach_service::services::providers::groq::{GroqClient, GroqConfig};
use coach_service::services::providers::{
    AudioClip, ChatProvider, GenerationParams, Prompt, ProviderError, TranscriptionProvider,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GroqClient {
    GroqClient::new(GroqConfig {
        api_key: "gsk-test".to_string(),
        api_base: server.uri(),
        chat_model: "llama-3.1-8b-instant".to_string(),
        transcription_model: "whisper-large-v3".to_string(),
        timeout: Duration::from_secs(5),
    })
    .expect("client should build")
}

fn prompt() -> Prompt {
    Prompt {
        system: "You are an interview coach.".to_string(),
        user: "Interviewer question:\nWhy us?".to_string(),
    }
}

fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "llama-3.1-8b-instant",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 42, "completion_tokens": 17, "total_tokens": 59 }
    })
}

#[tokio::test]
async fn chat_completion_sends_model_messages_and_params() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-8b-instant",
            "max_tokens": 300,
            "messages": [
                { "role": "system", "content": "You are an interview coach." },
                { "role": "user", "content": "Interviewer question:\nWhy us?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("I admire your mission.")))
        .expect(1)
        .mount(&server)
        .await;

    let params = GenerationParams {
        temperature: Some(0.7),
        max_tokens: Some(300),
    };
    let response = client(&server).complete(&prompt(), &params).await.unwrap();

    assert_eq!(response.text, "I admire your mission.");
    assert_eq!(response.input_tokens, 42);
    assert_eq!(response.output_tokens, 17);
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "tokens" }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&prompt(), &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn api_error_message_is_extracted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "message": "The model `nope` does not exist",
                "type": "invalid_request_error",
                "code": "model_not_found"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&prompt(), &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError(message) => {
            assert!(message.contains("404"));
            assert!(message.contains("The model `nope` does not exist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_choice_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&prompt(), &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn transcription_posts_multipart_and_reads_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer gsk-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "text": " Why do you want this job?" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transcript = client(&server)
        .transcribe(AudioClip {
            bytes: vec![0u8; 2048],
            file_name: "clip.webm".to_string(),
            content_type: "audio/webm".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(transcript, " Why do you want this job?");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"model\""));
    assert!(body.contains("whisper-large-v3"));
    assert!(body.contains("filename=\"clip.webm\""));
}

#[tokio::test]
async fn bad_request_maps_to_invalid_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "file must be one of flac mp3 mp4 m4a ogg wav webm" }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .transcribe(AudioClip {
            bytes: vec![0u8; 2048],
            file_name: "clip.bin".to_string(),
            content_type: "audio/webm".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ProviderError::InvalidRequest(message) => assert!(message.contains("file must be one of")),
        other => panic!("unexpected error: {other:?}"),
    }
}
