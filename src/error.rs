//! Error types for fitplan.
//!
//! One error kind per pipeline stage, non-overlapping: validation failures
//! are recoverable by the caller, generation and dispatch failures are
//! terminal for the request. Underlying causes are logged, never returned
//! to the HTTP caller.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors (startup only).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A required profile field is missing or empty.
///
/// Display is the exact client-facing 400 body: `"<field> is required"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Generative-model collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    RequestFailed(String),

    #[error("Model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// Plan generation errors (stage 2).
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Model returned an empty plan")]
    EmptyPlan,
}

/// Email dispatch errors (stage 3).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email message: {0}")]
    BuildFailed(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
