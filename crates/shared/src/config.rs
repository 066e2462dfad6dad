use std::time::Duration;

use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_list_env, parse_number_env};
use crate::llm::GroqClientConfig;
use crate::sessions::SessionPolicy;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["https://wagox-design.netlify.app"];
const DEFAULT_SESSION_MAX_HISTORY_MESSAGES: usize = 200;
const DEFAULT_SESSION_IDLE_TTL_SECONDS: u64 = 86_400;
const DEFAULT_SESSION_PRUNE_INTERVAL_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub completion: GroqClientConfig,
    pub session_max_history_messages: usize,
    pub session_idle_ttl_seconds: u64,
    pub session_prune_interval_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid number in env var {key}: {value}")]
    ParseInt { key: String, value: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
    #[error("failed to build completion http client: {0}")]
    HttpClient(String),
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_number_env("PORT", DEFAULT_PORT)?;

        Ok(Self {
            bind_addr: resolve_bind_addr(optional_trimmed_env("RELAY_BIND_ADDR"), port),
            allowed_origins: parse_list_env("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS),
            completion: GroqClientConfig::from_env()?,
            session_max_history_messages: parse_number_env(
                "SESSION_MAX_HISTORY_MESSAGES",
                DEFAULT_SESSION_MAX_HISTORY_MESSAGES,
            )?,
            session_idle_ttl_seconds: parse_number_env(
                "SESSION_IDLE_TTL_SECONDS",
                DEFAULT_SESSION_IDLE_TTL_SECONDS,
            )?,
            session_prune_interval_seconds: parse_number_env(
                "SESSION_PRUNE_INTERVAL_SECONDS",
                DEFAULT_SESSION_PRUNE_INTERVAL_SECONDS,
            )?,
        })
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            max_history_messages: self.session_max_history_messages,
            idle_ttl: (self.session_idle_ttl_seconds > 0)
                .then(|| Duration::from_secs(self.session_idle_ttl_seconds)),
        }
    }

    pub fn session_prune_interval(&self) -> Duration {
        Duration::from_secs(self.session_prune_interval_seconds.max(1))
    }
}

/// Loads `.env` from the working directory when present.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

/// Requires a non-blank `http://` or `https://` value for `key`.
pub(crate) fn require_http_url(key: &str, raw: Option<&str>) -> Result<String, ConfigError> {
    let value = require_non_blank(key, raw)?;
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::InvalidConfiguration(format!(
            "{key} must start with http:// or https://"
        )));
    }
    Ok(value)
}

pub(crate) fn require_non_blank(key: &str, raw: Option<&str>) -> Result<String, ConfigError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn resolve_bind_addr(explicit: Option<String>, port: u16) -> String {
    explicit.unwrap_or_else(|| format!("0.0.0.0:{port}"))
}
