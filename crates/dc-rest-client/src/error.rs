//! Error types for the REST API client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("base URL cannot carry path segments: {0}")]
    InvalidBaseUrl(String),

    /// The server answered with a structured `{error, suggestion}` body.
    /// Reported whatever the HTTP status was; some deployments send these
    /// with 200.
    #[error("server error: {message}")]
    Api {
        status: StatusCode,
        message: String,
        suggestion: Option<String>,
    },

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;
