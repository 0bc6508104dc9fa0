use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Groq's OpenAI-compatible API root.
const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Audio shorter than this is treated as silence / a mis-tap and never transcribed.
const DEFAULT_MIN_AUDIO_BYTES: usize = 1000;

/// Groq's own upload cap for transcription is 25 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const DEFAULT_FREE_QUESTION_LIMIT: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct CoachConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub models: ModelConfig,
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API (no trailing slash).
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Chat-completion model used for answers.
    pub chat_model: String,
    /// Speech-to-text model used for audio uploads.
    pub transcription_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in `x-api-key`. `None` disables the check.
    pub app_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Free questions per usage key. Zero disables the quota.
    pub free_question_limit: u32,
    pub min_audio_bytes: usize,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl CoachConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(CoachConfig {
            common: common_config,
            provider: ProviderConfig {
                api_key: get_env("GROQ_API_KEY", None, is_prod)?,
                api_base: get_env("GROQ_API_BASE", Some(DEFAULT_GROQ_API_BASE), is_prod)?
                    .trim_end_matches('/')
                    .to_string(),
                timeout_secs: parse_env(
                    get_env("PROVIDER_TIMEOUT_SECS", Some("60"), is_prod)?,
                    "PROVIDER_TIMEOUT_SECS",
                )?,
            },
            models: ModelConfig {
                chat_model: get_env("COACH_CHAT_MODEL", Some("llama-3.1-8b-instant"), is_prod)?,
                transcription_model: get_env(
                    "COACH_WHISPER_MODEL",
                    Some("whisper-large-v3"),
                    is_prod,
                )?,
                temperature: parse_env(
                    get_env("COACH_TEMPERATURE", Some("0.7"), is_prod)?,
                    "COACH_TEMPERATURE",
                )?,
                max_tokens: parse_env(
                    get_env("COACH_MAX_TOKENS", Some("300"), is_prod)?,
                    "COACH_MAX_TOKENS",
                )?,
            },
            auth: AuthConfig {
                app_secret: optional_env("APP_SECRET"),
            },
            limits: LimitsConfig {
                free_question_limit: parse_env(
                    get_env(
                        "FREE_QUESTION_LIMIT",
                        Some(&DEFAULT_FREE_QUESTION_LIMIT.to_string()),
                        is_prod,
                    )?,
                    "FREE_QUESTION_LIMIT",
                )?,
                min_audio_bytes: parse_env(
                    get_env(
                        "MIN_AUDIO_BYTES",
                        Some(&DEFAULT_MIN_AUDIO_BYTES.to_string()),
                        is_prod,
                    )?,
                    "MIN_AUDIO_BYTES",
                )?,
                max_upload_bytes: parse_env(
                    get_env(
                        "MAX_UPLOAD_BYTES",
                        Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                        is_prod,
                    )?,
                    "MAX_UPLOAD_BYTES",
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Secrets that are legitimately absent; blank counts as unset.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(raw: String, key: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e))
    })
}

/// `*` (or nothing) means any origin; otherwise a comma-separated allow-list.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}
