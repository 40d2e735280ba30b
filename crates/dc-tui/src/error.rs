//! Error types for the TUI application

use dc_rest_client::RestClientError;
use thiserror::Error;

/// Errors that can occur in the TUI application
#[derive(Debug, Error)]
pub enum TuiError {
    #[error("REST client error: {0}")]
    RestClient(#[from] RestClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TUI operations
pub type TuiResult<T> = Result<T, TuiError>;
