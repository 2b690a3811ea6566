// src/error.rs

//! Unified error handling for the content sync service.

use std::fmt;

use thiserror::Error;

/// Result type alias for content sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Webhook payload could not be read
    #[error("Malformed webhook payload: {0}")]
    Parse(String),

    /// No search client configured for an environment
    #[error("No search client configured for environment '{0}'")]
    ClientResolution(String),

    /// Unsupported language tag on a feed request
    #[error("Language {0} is not supported")]
    LocaleParse(String),

    /// A referenced resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Search engine answered with an unexpected status
    #[error("Search error on {context}: {message}")]
    Search { context: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a webhook parse error.
    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// Create a client resolution error for an environment.
    pub fn client_resolution(environment: impl Into<String>) -> Self {
        Self::ClientResolution(environment.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a search error with context.
    pub fn search(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Search {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error was caused by the caller's request rather than by
    /// this service or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::LocaleParse(_) | Self::NotFound(_))
    }
}
