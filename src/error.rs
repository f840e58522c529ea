//! Error types for the Weather SDK

use thiserror::Error;

/// Result type alias for the Weather SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Weather SDK errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or malformed config source)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (API key, city name, mode)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation attempted on a shut-down SDK instance
    #[error("SDK instance is shut down")]
    Shutdown,

    /// No SDK instance registered for the given API key
    #[error("No SDK instance registered for API key: {0}")]
    InstanceNotFound(String),

    /// Non-success response from the weather API
    #[error("Weather API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Error message or response body
        message: String,
    },

    /// API response body is missing required fields
    #[error("Malformed weather payload: {0}")]
    Payload(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// `true` when the error originates from the fetch collaborator
    /// (network, API status, or payload decoding) rather than from the
    /// SDK's own validation or lifecycle checks.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Payload(_) | Self::Http(_) | Self::Json(_)
        )
    }
}
