//! Service configuration.
//!
//! Values come from an optional `exhibits.toml` in the working directory,
//! overridden by `EXHIBITS__*` environment variables (a `.env` file is loaded
//! first when present). For example `EXHIBITS__DATABASE_URL` sets
//! `database_url`.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use exhibits_auth::AuthMode;
use exhibits_observability::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Deadline for each individual store lookup.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    #[serde(default)]
    pub auth_mode: AuthMode,

    /// HS256 secret shared with the login service. Required in `claims` mode.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_lookup_timeout_ms() -> u64 {
    2_000
}

impl AppConfig {
    /// Load from `.env`, `exhibits.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside local development.
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("exhibits").required(false))
            .add_source(
                config::Environment::with_prefix("EXHIBITS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_settings(settings)
    }

    /// Parse a TOML document (no environment overrides).
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<Self, ConfigError> {
        let cfg: AppConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid("database_url must be set".into()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be at least 1".into()));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid("lookup_timeout_ms must be greater than zero".into()));
        }
        if self.auth_mode == AuthMode::Claims && self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt_secret is required in claims mode".into()));
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

// Secrets stay out of logs.
impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("lookup_timeout_ms", &self.lookup_timeout_ms)
            .field("auth_mode", &self.auth_mode)
            .field("jwt_secret", &"<redacted>")
            .field("log_format", &self.log_format)
            .finish()
    }
}
