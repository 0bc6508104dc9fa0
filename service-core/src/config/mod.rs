use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Environment variable that overrides the listen port, as set by most PaaS hosts.
pub const PORT_OVERRIDE_VAR: &str = "PORT";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut config: Config = config.try_deserialize()?;

        if let Some(port) = port_override(std::env::var(PORT_OVERRIDE_VAR).ok().as_deref())? {
            config.port = port;
        }

        Ok(config)
    }
}

fn port_override(raw: Option<&str>) -> Result<Option<u16>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<u16>().map(Some).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "{} must be a valid port number, got {:?}: {}",
                PORT_OVERRIDE_VAR,
                value,
                e
            ))
        }),
    }
}
