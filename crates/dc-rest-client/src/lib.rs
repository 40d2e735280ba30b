//! REST API client for the DataChat analysis service
//!
//! This crate provides the HTTP client for the DataChat backend. Errors are
//! split into application errors (the server produced an `{error, suggestion}`
//! body) and transport errors (nothing usable came back); the orchestration
//! core treats the two very differently.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;

use async_trait::async_trait;
use dc_client_api::{ClientApi, ClientApiError, ClientApiResult};
use dc_rest_api_contract::*;

fn to_client_api_error(err: RestClientError) -> ClientApiError {
    match err {
        RestClientError::Api {
            message,
            suggestion,
            ..
        } => ClientApiError::Api {
            message,
            suggestion,
        },
        other => ClientApiError::Transport(other.to_string()),
    }
}

#[async_trait]
impl ClientApi for client::RestClient {
    async fn upload_table(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> ClientApiResult<SchemaInfo> {
        self.upload_csv(filename, content)
            .await
            .map(|response| response.schema)
            .map_err(to_client_api_error)
    }

    async fn remove_table(&self, filename: &str) -> ClientApiResult<SchemaInfo> {
        self.remove_table(filename)
            .await
            .map(|response| response.schema)
            .map_err(to_client_api_error)
    }

    async fn ask(&self, question: &str) -> ClientApiResult<QueryReply> {
        self.query(&QueryRequest::new(question))
            .await
            .map_err(to_client_api_error)
    }

    async fn health(&self) -> ClientApiResult<()> {
        self.health().await.map_err(to_client_api_error)
    }
}
