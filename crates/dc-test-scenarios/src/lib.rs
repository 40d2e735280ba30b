//! Scenario model and loader for TUI tests

use dc_rest_api_contract::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTerminal {
    pub width: Option<u16>,
    pub height: Option<u16>,
}

/// One stimulus or check in a scenario.
///
/// Stimuli either drive the input side (keys, typed text, staged files)
/// or script the next network outcome on the mock client. Scripting steps
/// must appear before the key press that triggers the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    AdvanceMs {
        ms: u64,
    },
    Key {
        key: String,
    },
    Type {
        text: String,
    },
    /// Stage a candidate file directly, bypassing the filesystem adapter.
    StageFile {
        name: String,
        #[serde(default)]
        content: String,
    },
    UploadOk {
        tables: Vec<String>,
    },
    UploadErr {
        error: String,
        #[serde(default)]
        suggestion: Option<String>,
    },
    RemoveOk {
        tables: Vec<String>,
    },
    RemoveErr {
        error: String,
    },
    QueryOk {
        sql: String,
        explanation: String,
        #[serde(default)]
        rows: Vec<Row>,
    },
    QueryErr {
        error: String,
        #[serde(default)]
        suggestion: Option<String>,
    },
    /// Transport failure for the next query request.
    QueryDown,
    AssertVm {
        #[serde(default)]
        view: Option<String>,
        #[serde(default)]
        messages: Option<usize>,
        #[serde(default)]
        tables: Option<usize>,
        #[serde(default)]
        pending: Option<usize>,
        #[serde(default)]
        submitting: Option<bool>,
        #[serde(default)]
        notice: Option<String>,
    },
    Snapshot {
        name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub terminal: Option<ScenarioTerminal>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
