//! Client API trait for the DataChat orchestration core
//!
//! The orchestration logic talks to the analysis service exclusively
//! through this trait, so tests can substitute a scripted mock for the
//! real HTTP client.

use async_trait::async_trait;
use dc_rest_api_contract::{QueryReply, SchemaInfo};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ClientApiError {
    /// The server answered with a structured error body.
    #[error("{message}")]
    Api {
        message: String,
        suggestion: Option<String>,
    },
    /// No usable response was received (network failure, malformed body).
    #[error("transport error: {0}")]
    Transport(String),
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait ClientApi: Send + Sync {
    /// Submit one table's raw bytes; the reply carries the post-upload schema.
    async fn upload_table(&self, filename: &str, content: Vec<u8>)
        -> ClientApiResult<SchemaInfo>;

    /// Drop a committed table; the reply carries the post-removal schema.
    async fn remove_table(&self, filename: &str) -> ClientApiResult<SchemaInfo>;

    /// Ask a natural-language question about the committed tables.
    async fn ask(&self, question: &str) -> ClientApiResult<QueryReply>;

    /// Liveness probe; the ack body is opaque and discarded.
    async fn health(&self) -> ClientApiResult<()>;
}
