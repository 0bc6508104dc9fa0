//! Spawns the real server on a random port and probes it over HTTP.

mod common;

use coach_service::services::providers::mock::{MockChatProvider, MockTranscriptionProvider};
use coach_service::startup::{AppState, Application};
use common::test_config;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

async fn spawn_app() -> u16 {
    let state = AppState::new(
        test_config(),
        Arc::new(MockChatProvider::replying("Stay calm.")),
        Arc::new(MockTranscriptionProvider::replying("unused")),
    );
    let app = Application::build_with_state(state)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "coach-service");
}

#[tokio::test]
async fn answer_over_http() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("http://127.0.0.1:{}/api/answer", port))
        .json(&serde_json::json!({ "question": "Where do you see yourself in 5 years?" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["answer"], "Stay calm.");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("http://127.0.0.1:{}/api/answer", port),
        )
        .header("origin", "https://coach.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,x-api-key")
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
