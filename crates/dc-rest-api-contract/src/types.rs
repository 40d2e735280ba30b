//! API contract types for the DataChat analysis service

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Server-side description of the currently committed tables.
///
/// The client never interprets this structure; it is replaced wholesale by
/// every successful upload or removal response and handed back to the UI
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaInfo(pub serde_json::Value);

impl SchemaInfo {
    /// An empty schema, the state before any table has been committed.
    pub fn empty() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }
}

/// A single scalar cell in a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// One row of a query result.
///
/// The server emits rows as JSON objects; key order is significant because
/// the first row's key order defines the displayed column order.
pub type Row = IndexMap<String, CellValue>;

/// Success body of `POST /upload/csv` and `POST /remove/{filename}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub schema: SchemaInfo,
}

/// Request body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, message = "Question cannot be empty"))]
    pub question: String,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Success body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReply {
    pub sql_query: String,
    pub explanation: String,
    pub data: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row_count: Option<u64>,
}

/// Error body any endpoint may return.
///
/// A response whose body carries a non-empty `error` field is an
/// application-level error regardless of HTTP status code; `suggestion` is
/// an optional remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggestion: Option<String>,
}

impl ApiErrorBody {
    /// Whether this body actually signals an error.
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
