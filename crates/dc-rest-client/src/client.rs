//! Main REST API client implementation

use dc_rest_api_contract::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{RestClientError, RestClientResult};

/// REST API client for the DataChat analysis service
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(base_url: Url) -> Self {
        let http_client = HttpClient::builder()
            .user_agent("dc-tui/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url,
        }
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str) -> RestClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Ok(Self::new(base_url))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Upload one CSV table. The reply carries the schema covering every
    /// committed table, not just the new one.
    pub async fn upload_csv(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> RestClientResult<SchemaResponse> {
        let url = self.base_url.join("/upload/csv")?;
        let part = Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self.http_client.post(url).multipart(form).send().await?;
        self.handle_response(response).await
    }

    /// Remove a committed table by its filename.
    pub async fn remove_table(&self, filename: &str) -> RestClientResult<SchemaResponse> {
        let url = self.remove_url(filename)?;
        let response = self.http_client.post(url).send().await?;
        self.handle_response(response).await
    }

    /// Ask a natural-language question about the committed tables.
    pub async fn query(&self, request: &QueryRequest) -> RestClientResult<QueryReply> {
        let url = self.base_url.join("/query")?;
        let response = self.http_client.post(url).json(request).send().await?;
        self.handle_response(response).await
    }

    /// Liveness probe against the service root. The ack body is discarded.
    pub async fn health(&self) -> RestClientResult<()> {
        let response = self.http_client.get(self.base_url.clone()).send().await?;
        response.error_for_status()?;
        Ok(())
    }

    // Private helper methods

    /// Build `/remove/{filename}` with the filename percent-encoded as a
    /// single path segment (an embedded `/` becomes `%2F`).
    fn remove_url(&self, filename: &str) -> RestClientResult<Url> {
        let mut url = self.base_url.join("/remove")?;
        url.path_segments_mut()
            .map_err(|()| RestClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .push(filename);
        Ok(url)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RestClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        decode_body(status, &text)
    }
}

/// Decode a response body, giving a structured `{error, suggestion}` payload
/// precedence over the HTTP status code.
fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> RestClientResult<T> {
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(text) {
        if body.is_error() {
            return Err(RestClientError::Api {
                status,
                message: body.error,
                suggestion: body.suggestion,
            });
        }
    }

    if status.is_success() {
        serde_json::from_str(text).map_err(RestClientError::from)
    } else {
        Err(RestClientError::UnexpectedResponse(format!(
            "status {status}: {text}"
        )))
    }
}
