//! Error taxonomy for podcast generation
//!
//! Every failure is caught at the action boundary of the screen and rendered
//! into the status line. Only configuration errors are fatal, and only at
//! startup.

use std::fmt;
use thiserror::Error;

/// External service that produced an upstream failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    ChatCompletion,
    SpeechSynthesis,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::ChatCompletion => write!(f, "chat completion"),
            Service::SpeechSynthesis => write!(f, "speech synthesis"),
        }
    }
}

/// Missing or invalid configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key for {provider} (set {env_var} or add it to the config file)")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("invalid configuration value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Configuration problem (fatal at startup, reported at action time otherwise)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before any call was made
    #[error("{0}")]
    Validation(String),

    /// Chat or speech service call failed; carries the raw upstream message
    #[error("{service} failed: {message}")]
    Upstream { service: Service, message: String },

    /// Output directory or file could not be written
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Task was cancelled by the user before it finished
    #[error("Cancelled")]
    Cancelled,
}

impl GeneratorError {
    pub fn validation(message: impl Into<String>) -> Self {
        GeneratorError::Validation(message.into())
    }

    pub fn chat(message: impl Into<String>) -> Self {
        GeneratorError::Upstream {
            service: Service::ChatCompletion,
            message: message.into(),
        }
    }

    pub fn speech(message: impl Into<String>) -> Self {
        GeneratorError::Upstream {
            service: Service::SpeechSynthesis,
            message: message.into(),
        }
    }

    /// Short prefix used in the in-app log panel
    pub fn log_level(&self) -> &'static str {
        match self {
            GeneratorError::Validation(_) | GeneratorError::Cancelled => "WARN",
            _ => "ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
