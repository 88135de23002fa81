//! Process configuration, read once at startup.
//!
//! Components never read ambient environment state; everything they need is
//! built here and passed in by ownership. Missing credentials refuse startup.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default chat model when `OPENAI_MODEL` is not set.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Generative-model collaborator configuration.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key for the chat-completions endpoint.
    pub api_key: SecretString,
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// API base URL, overridable for tests.
    pub base_url: String,
    /// Request timeout. The original relied on the client library default;
    /// here it is an explicit knob (`MODEL_TIMEOUT_SECS`).
    pub timeout: Duration,
}

/// Mail-transport collaborator configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Fixed sender identity; also the SMTP username.
    pub sender: String,
    pub password: SecretString,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub smtp: SmtpConfig,
    /// HTTP listen port.
    pub port: u16,
    /// Upstream catalog URL for the store passthrough.
    pub store_api_url: String,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Required: `OPENAI_API_KEY`, `SENDER_EMAIL`, `SENDER_PASSWORD`.
    /// Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_env("OPENAI_API_KEY")?;
        let sender = require_env("SENDER_EMAIL")?;
        let password = require_env("SENDER_PASSWORD")?;

        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let timeout_secs: u64 = parse_env("MODEL_TIMEOUT_SECS", 60)?;

        let smtp_host =
            std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port: u16 = parse_env("SMTP_PORT", 587)?;

        let port: u16 = parse_env("PORT", 10000)?;

        let store_api_url = std::env::var("STORE_API_URL")
            .unwrap_or_else(|_| "https://fakestoreapi.com/products".to_string());

        Ok(Self {
            model: ModelConfig {
                api_key: SecretString::from(api_key),
                model,
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            smtp: SmtpConfig {
                host: smtp_host,
                port: smtp_port,
                sender,
                password: SecretString::from(password),
            },
            port,
            store_api_url,
        })
    }
}

/// Read a required environment variable; empty counts as missing.
fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Read an optional environment variable, parsing it or falling back.
fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: name.to_string(),
            message: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}
