//! Test harness that drives the real update loop against a scripted mock
//! client and an off-screen terminal.
//!
//! Scenarios written in the `dc-test-scenarios` JSON dialect are executed
//! step by step: input steps feed the model exactly like the event loop
//! would, scripting steps queue the next network outcome on the mock, and
//! assertion steps check the derived view model or a golden snapshot.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{self, Duration};

use dc_client_api::ClientApiError;
use dc_core::{PendingFile, ViewMode};
use dc_rest_api_contract::QueryReply;
use dc_rest_client_mock::MockClient;
use dc_test_scenarios::{Scenario, Step};

use crate::golden::GoldenManager;
use crate::model::Model;
use crate::msg::{Msg, NetMsg};
use crate::ui;
use crate::viewmodel::ViewModel;

pub struct TestRuntime {
    terminal: Terminal<TestBackend>,
    model: Model<MockClient>,
    net_rx: mpsc::UnboundedReceiver<NetMsg>,
    golden: GoldenManager,
    pub client: Arc<MockClient>,
    pub view_model: ViewModel,
}

impl TestRuntime {
    /// Build a runtime whose startup probe already succeeded, so scenarios
    /// begin from a connected session.
    pub async fn new(width: u16, height: u16) -> Result<Self> {
        let backend = TestBackend::new(width, height);
        let terminal = Terminal::new(backend)?;

        let client = Arc::new(MockClient::new());
        client.push_probe(Ok(()));

        let (net_tx, net_rx) = mpsc::unbounded_channel();
        let model = Model::new(Arc::clone(&client), net_tx);
        let view_model = ViewModel::from_state(&model.state);

        let mut runtime = Self {
            terminal,
            model,
            net_rx,
            golden: GoldenManager::new("scenarios"),
            client,
            view_model,
        };
        runtime.model.spawn_probe();
        runtime.drain_net().await;
        runtime.refresh()?;
        Ok(runtime)
    }

    pub async fn execute_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::AdvanceMs { ms } => {
                time::advance(Duration::from_millis(*ms)).await;
                self.drain_net().await;
                self.model.update(Msg::Tick).await;
            }
            Step::Key { key } => {
                let event = parse_key(key)?;
                self.model.update(Msg::Key(event)).await;
            }
            Step::Type { text } => {
                for ch in text.chars() {
                    let event = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE);
                    self.model.update(Msg::Key(event)).await;
                }
            }
            Step::StageFile { name, content } => {
                self.model.stage_candidates(vec![PendingFile {
                    name: name.clone(),
                    content: content.clone().into_bytes(),
                }]);
            }
            Step::UploadOk { tables } => {
                let names: Vec<&str> = tables.iter().map(String::as_str).collect();
                self.client.push_upload(Ok(MockClient::schema_for(&names)));
            }
            Step::UploadErr { error, suggestion } => {
                self.client.push_upload(Err(ClientApiError::Api {
                    message: error.clone(),
                    suggestion: suggestion.clone(),
                }));
            }
            Step::RemoveOk { tables } => {
                let names: Vec<&str> = tables.iter().map(String::as_str).collect();
                self.client.push_removal(Ok(MockClient::schema_for(&names)));
            }
            Step::RemoveErr { error } => {
                self.client.push_removal(Err(ClientApiError::Api {
                    message: error.clone(),
                    suggestion: None,
                }));
            }
            Step::QueryOk {
                sql,
                explanation,
                rows,
            } => {
                self.client.push_reply(Ok(QueryReply {
                    sql_query: sql.clone(),
                    explanation: explanation.clone(),
                    data: rows.clone(),
                    row_count: None,
                }));
            }
            Step::QueryErr { error, suggestion } => {
                self.client.push_reply(Err(ClientApiError::Api {
                    message: error.clone(),
                    suggestion: suggestion.clone(),
                }));
            }
            Step::QueryDown => {
                self.client
                    .push_reply(Err(ClientApiError::Transport("connection refused".into())));
            }
            Step::AssertVm {
                view,
                messages,
                tables,
                pending,
                submitting,
                notice,
            } => {
                self.refresh()?;
                self.check_view_model(view, messages, tables, pending, submitting, notice)?;
            }
            Step::Snapshot { name } => {
                self.refresh()?;
                let content = self.buffer_content();
                self.golden.compare_or_update(name, &content)?;
            }
        }
        self.refresh()
    }

    #[allow(clippy::too_many_arguments)]
    fn check_view_model(
        &self,
        view: &Option<String>,
        messages: &Option<usize>,
        tables: &Option<usize>,
        pending: &Option<usize>,
        submitting: &Option<bool>,
        notice: &Option<String>,
    ) -> Result<()> {
        if let Some(expected) = view {
            let actual = match self.view_model.view {
                ViewMode::Chat => "chat",
                ViewMode::UploadManager => "uploadManager",
            };
            if actual != expected {
                bail!("view: expected {expected}, got {actual}");
            }
        }
        if let Some(expected) = messages {
            let actual = self.view_model.messages.len();
            if actual != *expected {
                bail!("messages: expected {expected}, got {actual}");
            }
        }
        if let Some(expected) = tables {
            let actual = self.view_model.tables.len();
            if actual != *expected {
                bail!("tables: expected {expected}, got {actual}");
            }
        }
        if let Some(expected) = pending {
            let actual = self.view_model.pending.len();
            if actual != *expected {
                bail!("pending: expected {expected}, got {actual}");
            }
        }
        if let Some(expected) = submitting {
            if self.view_model.submitting != *expected {
                bail!(
                    "submitting: expected {expected}, got {}",
                    self.view_model.submitting
                );
            }
        }
        if let Some(expected) = notice {
            match &self.view_model.notice {
                Some(actual) if actual == expected => {}
                other => bail!("notice: expected {expected:?}, got {other:?}"),
            }
        }
        Ok(())
    }

    /// Feed every outcome the spawned request tasks have produced back into
    /// the model, the way the event loop does.
    async fn drain_net(&mut self) {
        loop {
            match time::timeout(Duration::from_millis(1), self.net_rx.recv()).await {
                Ok(Some(net)) => self.model.update(Msg::Net(net)).await,
                Ok(None) | Err(_) => break,
            }
        }
    }

    fn refresh(&mut self) -> Result<()> {
        self.view_model = ViewModel::from_state(&self.model.state);
        let view_model = &self.view_model;
        self.terminal
            .draw(|f| ui::draw_root(f, f.area(), view_model))?;
        Ok(())
    }

    /// The rendered screen as one string with a newline per terminal row.
    pub fn buffer_content(&self) -> String {
        let buffer = self.terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    out.push_str(cell.symbol());
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Translate a scenario key spec ("Enter", "Ctrl+U", "a") into a key event.
pub fn parse_key(spec: &str) -> Result<KeyEvent> {
    if let Some(rest) = spec.strip_prefix("Ctrl+") {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(KeyEvent::new(
                KeyCode::Char(ch.to_ascii_lowercase()),
                KeyModifiers::CONTROL,
            )),
            _ => bail!("unsupported key spec: {spec}"),
        };
    }

    let code = match spec {
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "Esc" => KeyCode::Esc,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Backspace" => KeyCode::Backspace,
        "Delete" => KeyCode::Delete,
        single if single.chars().count() == 1 => {
            let Some(ch) = single.chars().next() else {
                bail!("unsupported key spec: {spec}");
            };
            KeyCode::Char(ch)
        }
        other => bail!("unsupported key spec: {other}"),
    };
    Ok(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Run every step of a scenario under a paused clock.
pub async fn execute_scenario(scenario: &Scenario) -> Result<()> {
    time::pause();

    let (width, height) = scenario
        .terminal
        .as_ref()
        .map(|t| (t.width.unwrap_or(100), t.height.unwrap_or(30)))
        .unwrap_or((100, 30));

    let mut runtime = TestRuntime::new(width, height).await?;
    for (index, step) in scenario.steps.iter().enumerate() {
        runtime
            .execute_step(step)
            .await
            .with_context(|| format!("scenario '{}' step {index}", scenario.name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_specs_cover_names_chords_and_characters() {
        let enter = parse_key("Enter").expect("named key");
        assert_eq!(enter.code, KeyCode::Enter);
        assert_eq!(enter.modifiers, KeyModifiers::NONE);

        let chord = parse_key("Ctrl+U").expect("control chord");
        assert_eq!(chord.code, KeyCode::Char('u'));
        assert_eq!(chord.modifiers, KeyModifiers::CONTROL);

        let plain = parse_key("x").expect("plain character");
        assert_eq!(plain.code, KeyCode::Char('x'));

        assert!(parse_key("Hyper+Q").is_err());
        assert!(parse_key("").is_err());
    }

    #[tokio::test]
    async fn boots_into_the_manager_with_the_probe_settled() {
        let mut runtime = TestRuntime::new(80, 24).await.expect("runtime");
        assert!(runtime.buffer_content().contains("DataChat AI"));
        assert!(matches!(runtime.view_model.view, ViewMode::UploadManager));

        // With nothing uploaded, Esc cannot leave the manager.
        runtime
            .execute_step(&Step::Key { key: "Esc".into() })
            .await
            .expect("step");
        assert!(matches!(runtime.view_model.view, ViewMode::UploadManager));
    }
}
