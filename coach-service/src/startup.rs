//! Application startup and lifecycle management.

use crate::config::{CoachConfig, CorsConfig};
use crate::handlers;
use crate::middleware::{api_key_middleware, API_KEY_HEADER};
use crate::services::providers::groq::{GroqClient, GroqConfig};
use crate::services::providers::{ChatProvider, GenerationParams, TranscriptionProvider};
use crate::services::{Coach, CoachLimits, UsageTracker};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: CoachConfig,
    pub coach: Coach,
}

impl AppState {
    /// Wire the coaching pipeline around the given providers with a fresh usage table.
    pub fn new(
        config: CoachConfig,
        chat: Arc<dyn ChatProvider>,
        transcriber: Arc<dyn TranscriptionProvider>,
    ) -> Self {
        let params = GenerationParams {
            temperature: Some(config.models.temperature),
            max_tokens: Some(config.models.max_tokens),
        };
        let limits = CoachLimits {
            free_question_limit: config.limits.free_question_limit,
            min_audio_bytes: config.limits.min_audio_bytes,
        };
        let coach = Coach::new(chat, transcriber, UsageTracker::new(), params, limits);

        Self { config, coach }
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the full HTTP router for the given state.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/answer", post(handlers::answer_question))
        .route("/api/whisper", post(handlers::live_feedback))
        .route("/process", post(handlers::process_submission))
        .route("/process_audio", post(handlers::process_submission))
        .route("/save_email", post(handlers::save_email))
        .route_layer(from_fn_with_state(state.clone(), api_key_middleware));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.config.limits.max_upload_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.cors))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application against Groq.
    pub async fn build(config: CoachConfig) -> Result<Self, AppError> {
        let groq = Arc::new(
            GroqClient::new(GroqConfig {
                api_key: config.provider.api_key.clone(),
                api_base: config.provider.api_base.clone(),
                chat_model: config.models.chat_model.clone(),
                transcription_model: config.models.transcription_model.clone(),
                timeout: Duration::from_secs(config.provider.timeout_secs),
            })
            .map_err(|e| {
                tracing::error!("Failed to initialize Groq client: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e))
            })?,
        );

        tracing::info!(
            chat_model = %config.models.chat_model,
            transcription_model = %config.models.transcription_model,
            "Initialized Groq provider"
        );

        let state = AppState::new(config, groq.clone(), groq);
        Self::build_with_state(state).await
    }

    /// Build the application around a prepared state; tests inject mock providers here.
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            free_question_limit = state.config.limits.free_question_limit,
            api_key_required = state.config.auth.app_secret.is_some(),
            "Listening on {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Serve until `signal` resolves, letting in-flight requests finish.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
