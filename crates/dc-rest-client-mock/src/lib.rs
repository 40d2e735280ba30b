//! Scriptable mock client for exercising the orchestration core
//!
//! Tests queue per-operation outcomes ahead of time; every call pops the next
//! scripted outcome and is recorded in a journal so tests can assert on call
//! order. An exhausted queue yields a transport error rather than blocking,
//! so a test that forgets to script a response fails loudly.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use dc_client_api::{ClientApi, ClientApiError, ClientApiResult};
use dc_rest_api_contract::{QueryReply, SchemaInfo};

/// One observed call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Upload { filename: String, bytes: usize },
    Remove { filename: String },
    Ask { question: String },
    Health,
}

#[derive(Default)]
struct Script {
    uploads: VecDeque<ClientApiResult<SchemaInfo>>,
    removals: VecDeque<ClientApiResult<SchemaInfo>>,
    replies: VecDeque<ClientApiResult<QueryReply>>,
    probes: VecDeque<ClientApiResult<()>>,
    journal: Vec<RecordedCall>,
}

#[derive(Default)]
pub struct MockClient {
    script: Mutex<Script>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, outcome: ClientApiResult<SchemaInfo>) {
        self.script().uploads.push_back(outcome);
    }

    pub fn push_removal(&self, outcome: ClientApiResult<SchemaInfo>) {
        self.script().removals.push_back(outcome);
    }

    pub fn push_reply(&self, outcome: ClientApiResult<QueryReply>) {
        self.script().replies.push_back(outcome);
    }

    pub fn push_probe(&self, outcome: ClientApiResult<()>) {
        self.script().probes.push_back(outcome);
    }

    /// Every call observed so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().journal.clone()
    }

    /// A schema shaped like the real service's reply, covering `tables`.
    pub fn schema_for(tables: &[&str]) -> SchemaInfo {
        let mut map = serde_json::Map::new();
        for table in tables {
            map.insert(
                table.to_string(),
                serde_json::json!({ "columns": [] }),
            );
        }
        SchemaInfo(serde_json::Value::Object(map))
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("mock script lock poisoned")
    }
}

fn exhausted<T>(operation: &str) -> ClientApiResult<T> {
    Err(ClientApiError::Transport(format!(
        "mock script exhausted: {operation}"
    )))
}

#[async_trait]
impl ClientApi for MockClient {
    async fn upload_table(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> ClientApiResult<SchemaInfo> {
        let mut script = self.script();
        script.journal.push(RecordedCall::Upload {
            filename: filename.to_string(),
            bytes: content.len(),
        });
        script
            .uploads
            .pop_front()
            .unwrap_or_else(|| exhausted("upload"))
    }

    async fn remove_table(&self, filename: &str) -> ClientApiResult<SchemaInfo> {
        let mut script = self.script();
        script.journal.push(RecordedCall::Remove {
            filename: filename.to_string(),
        });
        script
            .removals
            .pop_front()
            .unwrap_or_else(|| exhausted("remove"))
    }

    async fn ask(&self, question: &str) -> ClientApiResult<QueryReply> {
        let mut script = self.script();
        script.journal.push(RecordedCall::Ask {
            question: question.to_string(),
        });
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| exhausted("ask"))
    }

    async fn health(&self) -> ClientApiResult<()> {
        let mut script = self.script();
        script.journal.push(RecordedCall::Health);
        script
            .probes
            .pop_front()
            .unwrap_or_else(|| exhausted("health"))
    }
}
