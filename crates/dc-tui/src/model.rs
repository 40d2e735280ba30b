//! The Model layer - domain state and rules (no Ratatui)
//!
//! This binds key events to the dc-core orchestrators and processes
//! settled network outcomes. Upload batches are awaited inline, so the
//! event loop itself enforces their sequential ordering; question
//! submissions are spawned and settle later through a `NetMsg`, which is
//! what keeps the log clearable while a query is in flight.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dc_client_api::ClientApi;
use dc_core::{remove_table, PendingFile, SubmitError, ViewMode, SUGGESTED_QUESTIONS};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::{AppState, ManagerFocus};
use crate::files;
use crate::msg::{Msg, NetMsg};

/// Selection rejected some candidates before anything was sent.
pub const SKIPPED_FILES_NOTICE: &str =
    "Some files were skipped. Only CSV and PDF files are supported.";

/// Commit requested with nothing staged.
pub const EMPTY_SELECTION_NOTICE: &str = "Please select at least one file";

/// Submission attempted with a blank question.
pub const EMPTY_QUESTION_NOTICE: &str = "Please provide a question";

/// The startup probe got no answer from the server.
pub const SERVER_UNREACHABLE_NOTICE: &str = "Network error: Unable to connect to server";

/// The Model represents the domain state and business logic
/// It processes messages and updates state deterministically
pub struct Model<C: ClientApi + 'static> {
    pub state: AppState,
    client: Arc<C>,
    net_tx: mpsc::UnboundedSender<NetMsg>,
}

impl<C: ClientApi + 'static> Model<C> {
    /// Create a new model with initial state
    pub fn new(client: Arc<C>, net_tx: mpsc::UnboundedSender<NetMsg>) -> Self {
        Self::with_state(AppState::default(), client, net_tx)
    }

    /// Create a model around preconfigured state (PDF mode, staged files)
    pub fn with_state(
        state: AppState,
        client: Arc<C>,
        net_tx: mpsc::UnboundedSender<NetMsg>,
    ) -> Self {
        Self {
            state,
            client,
            net_tx,
        }
    }

    /// Probe the server once; the outcome arrives as `NetMsg::Probe`.
    pub fn spawn_probe(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.net_tx.clone();
        tokio::spawn(async move {
            let outcome = client.health().await;
            let _ = tx.send(NetMsg::Probe(outcome));
        });
    }

    /// Process a single message and update state
    pub async fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Key(key_event) => self.handle_key(key_event).await,
            Msg::Tick => self.handle_tick(),
            Msg::Net(net_msg) => self.handle_net_msg(net_msg),
            Msg::Quit => {
                // Quit is handled at the application level
            }
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key_event: KeyEvent) {
        // Any keystroke dismisses the previous transient notice
        self.state.notice = None;

        match self.state.session.view() {
            ViewMode::UploadManager => self.handle_manager_key(key_event).await,
            ViewMode::Chat => self.handle_chat_key(key_event),
        }
    }

    /// Handle time tick
    fn handle_tick(&mut self) {
        // Periodic updates can be handled here
    }

    /// Handle settled network outcomes
    fn handle_net_msg(&mut self, net_msg: NetMsg) {
        match net_msg {
            NetMsg::Probe(outcome) => {
                self.state.server_online = Some(outcome.is_ok());
                if let Err(error) = outcome {
                    debug!(%error, "liveness probe failed");
                    self.state.notice = Some(SERVER_UNREACHABLE_NOTICE.to_string());
                }
            }
            NetMsg::Query(outcome) => {
                // Settles even if the log was cleared while in flight
                self.state.chat.settle(outcome, Local::now());
            }
        }
    }

    fn handle_chat_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL) {
            match key_event.code {
                KeyCode::Char('l') => {
                    // Clearing is a no-op while the log is already empty
                    if !self.state.chat.is_empty() {
                        debug!("clearing conversation log");
                        self.state.chat.clear();
                        self.state.selected_suggestion = 0;
                    }
                }
                KeyCode::Char('u') => {
                    self.state.session.set_view(ViewMode::UploadManager);
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Enter => self.submit_question(),
            KeyCode::Tab => {
                // Pre-fill the input from the highlighted starter question
                if self.state.chat.is_empty() {
                    if let Some(question) = SUGGESTED_QUESTIONS.get(self.state.selected_suggestion)
                    {
                        self.state.question_input = (*question).to_string();
                    }
                }
            }
            KeyCode::Up => {
                self.state.selected_suggestion = self.state.selected_suggestion.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = SUGGESTED_QUESTIONS.len().saturating_sub(1);
                if self.state.selected_suggestion < max {
                    self.state.selected_suggestion += 1;
                }
            }
            KeyCode::Char(c) => self.state.question_input.push(c),
            KeyCode::Backspace => {
                self.state.question_input.pop();
            }
            _ => {}
        }
    }

    async fn handle_manager_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => {
                // Back to the chat; the session ignores this while no
                // table is committed
                self.state.session.set_view(ViewMode::Chat);
                return;
            }
            KeyCode::Tab => {
                self.state.manager_focus = match self.state.manager_focus {
                    ManagerFocus::PathInput => ManagerFocus::Pending,
                    ManagerFocus::Pending => ManagerFocus::Tables,
                    ManagerFocus::Tables => ManagerFocus::PathInput,
                };
                return;
            }
            _ => {}
        }

        match self.state.manager_focus {
            ManagerFocus::PathInput => match key_event.code {
                KeyCode::Enter => {
                    let typed = std::mem::take(&mut self.state.path_input);
                    let path = typed.trim();
                    if !path.is_empty() {
                        self.stage_paths(&[PathBuf::from(path)]);
                    }
                }
                KeyCode::Char(c) => self.state.path_input.push(c),
                KeyCode::Backspace => {
                    self.state.path_input.pop();
                }
                _ => {}
            },
            ManagerFocus::Pending => match key_event.code {
                KeyCode::Enter => self.commit_batch().await,
                KeyCode::Delete => self.discard_selected(),
                KeyCode::Up => {
                    self.state.selected_pending = self.state.selected_pending.saturating_sub(1);
                }
                KeyCode::Down => {
                    let max = self.state.staging.pending().len().saturating_sub(1);
                    if self.state.selected_pending < max {
                        self.state.selected_pending += 1;
                    }
                }
                _ => {}
            },
            ManagerFocus::Tables => match key_event.code {
                KeyCode::Delete => self.remove_selected().await,
                KeyCode::Up => {
                    self.state.selected_table = self.state.selected_table.saturating_sub(1);
                }
                KeyCode::Down => {
                    let max = self.state.session.tables().len().saturating_sub(1);
                    if self.state.selected_table < max {
                        self.state.selected_table += 1;
                    }
                }
                _ => {}
            },
        }
    }

    /// Read paths from disk and run them through file selection.
    pub fn stage_paths(&mut self, paths: &[PathBuf]) {
        let (candidates, failures) = files::read_candidates(paths);
        self.stage_candidates(candidates);
        if self.state.notice.is_none() {
            if let Some((path, error)) = failures.first() {
                self.state.notice = Some(format!("Could not read {}: {error}", path.display()));
            }
        }
    }

    /// Stage candidates that already carry their bytes.
    pub fn stage_candidates(&mut self, candidates: Vec<PendingFile>) {
        let selection = self
            .state
            .staging
            .select_files(candidates, self.state.session.tables());
        if !selection.staged.is_empty() {
            debug!(staged = selection.staged.len(), "staged files for upload");
        }
        if selection.rejected > 0 {
            self.state.notice = Some(SKIPPED_FILES_NOTICE.to_string());
        }
    }

    fn discard_selected(&mut self) {
        let Some(file) = self.state.staging.pending().get(self.state.selected_pending) else {
            return;
        };
        let name = file.name.clone();
        self.state.staging.discard(&name);
        self.clamp_cursors();
    }

    /// Submit every staged file, one at a time, inline on the event loop.
    async fn commit_batch(&mut self) {
        if self.state.staging.is_empty() {
            self.state.notice = Some(EMPTY_SELECTION_NOTICE.to_string());
            return;
        }

        let client = Arc::clone(&self.client);
        let report = self
            .state
            .staging
            .commit(&mut self.state.session, client.as_ref())
            .await;

        if let Some(failure) = &report.failed {
            self.state.notice = Some(format!("Upload failed: {}", failure.error));
        } else if !report.committed.is_empty() {
            // A fully committed batch drops the user straight into the chat
            self.state.session.set_view(ViewMode::Chat);
        }
        self.clamp_cursors();
    }

    async fn remove_selected(&mut self) {
        let Some(name) = self
            .state
            .session
            .tables()
            .get(self.state.selected_table)
            .cloned()
        else {
            return;
        };

        let client = Arc::clone(&self.client);
        if let Err(error) = remove_table(&mut self.state.session, client.as_ref(), &name).await {
            self.state.notice = Some(format!("Failed to remove file: {error}"));
        }
        self.clamp_cursors();
    }

    fn submit_question(&mut self) {
        let input = std::mem::take(&mut self.state.question_input);
        match self.state.chat.begin_submit(&input, Local::now()) {
            Ok(question) => {
                debug!(%question, "submitting question");
                let client = Arc::clone(&self.client);
                let tx = self.net_tx.clone();
                tokio::spawn(async move {
                    let outcome = client.ask(&question).await;
                    let _ = tx.send(NetMsg::Query(outcome));
                });
            }
            Err(error) => {
                // A rejected submission must not eat what was typed
                self.state.question_input = input;
                if matches!(error, SubmitError::EmptyQuestion) {
                    self.state.notice = Some(EMPTY_QUESTION_NOTICE.to_string());
                }
            }
        }
    }

    fn clamp_cursors(&mut self) {
        let pending_max = self.state.staging.pending().len().saturating_sub(1);
        self.state.selected_pending = self.state.selected_pending.min(pending_max);
        let table_max = self.state.session.tables().len().saturating_sub(1);
        self.state.selected_table = self.state.selected_table.min(table_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dc_client_api::ClientApiError;
    use dc_rest_api_contract::{QueryReply, Row};
    use dc_rest_client_mock::MockClient;

    fn test_model() -> (
        Model<MockClient>,
        Arc<MockClient>,
        mpsc::UnboundedReceiver<NetMsg>,
    ) {
        let client = Arc::new(MockClient::new());
        let (net_tx, net_rx) = mpsc::unbounded_channel();
        let model = Model::new(Arc::clone(&client), net_tx);
        (model, client, net_rx)
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Msg {
        Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    async fn type_text(model: &mut Model<MockClient>, text: &str) {
        for c in text.chars() {
            model.update(key(KeyCode::Char(c))).await;
        }
    }

    fn rows(json: &str) -> Vec<Row> {
        serde_json::from_str(json).expect("rows fixture")
    }

    #[tokio::test]
    async fn committed_batch_switches_to_chat() {
        let (mut model, client, _net_rx) = test_model();
        client.push_upload(Ok(MockClient::schema_for(&["sales.csv"])));

        model.stage_candidates(vec![PendingFile::new("sales.csv", b"a,b\n".to_vec())]);
        model.update(key(KeyCode::Tab)).await; // focus pending list
        model.update(key(KeyCode::Enter)).await; // commit

        assert_eq!(model.state.session.tables(), ["sales.csv"]);
        assert_eq!(model.state.session.view(), ViewMode::Chat);
        assert!(model.state.staging.is_empty());
    }

    #[tokio::test]
    async fn failed_batch_stays_in_manager_with_notice() {
        let (mut model, client, _net_rx) = test_model();
        client.push_upload(Ok(MockClient::schema_for(&["a.csv"])));
        client.push_upload(Err(ClientApiError::Api {
            message: "bad header row".to_string(),
            suggestion: None,
        }));

        model.stage_candidates(vec![
            PendingFile::new("a.csv", b"1\n".to_vec()),
            PendingFile::new("b.csv", b"2\n".to_vec()),
        ]);
        model.update(key(KeyCode::Tab)).await;
        model.update(key(KeyCode::Enter)).await;

        assert_eq!(model.state.session.tables(), ["a.csv"]);
        assert_eq!(model.state.session.view(), ViewMode::UploadManager);
        assert_eq!(
            model.state.notice.as_deref(),
            Some("Upload failed: bad header row")
        );
        let still_pending: Vec<&str> = model
            .state
            .staging
            .pending()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(still_pending, ["b.csv"]);
    }

    #[tokio::test]
    async fn empty_commit_asks_for_a_file() {
        let (mut model, client, _net_rx) = test_model();

        model.update(key(KeyCode::Tab)).await;
        model.update(key(KeyCode::Enter)).await;

        assert_eq!(model.state.notice.as_deref(), Some(EMPTY_SELECTION_NOTICE));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn whitespace_question_is_rejected_locally() {
        let (mut model, client, _net_rx) = test_model();
        model
            .state
            .session
            .apply_upload("sales.csv", MockClient::schema_for(&["sales.csv"]));
        model.state.session.set_view(ViewMode::Chat);

        type_text(&mut model, "   ").await;
        model.update(key(KeyCode::Enter)).await;

        assert_eq!(model.state.notice.as_deref(), Some(EMPTY_QUESTION_NOTICE));
        assert!(model.state.chat.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn question_settles_through_net_message() {
        let (mut model, client, mut net_rx) = test_model();
        model
            .state
            .session
            .apply_upload("sales.csv", MockClient::schema_for(&["sales.csv"]));
        model.state.session.set_view(ViewMode::Chat);
        client.push_reply(Ok(QueryReply {
            sql_query: "SELECT 1".to_string(),
            explanation: "one".to_string(),
            data: rows(r#"[{"count": 5}]"#),
            row_count: Some(1),
        }));

        type_text(&mut model, "how many?").await;
        model.update(key(KeyCode::Enter)).await;

        assert!(model.state.chat.is_submitting());
        assert!(model.state.question_input.is_empty());
        assert_eq!(model.state.chat.messages().len(), 1);

        let net = net_rx.recv().await.expect("query outcome");
        model.update(Msg::Net(net)).await;

        assert!(!model.state.chat.is_submitting());
        assert_eq!(model.state.chat.messages().len(), 2);
    }

    #[tokio::test]
    async fn second_submission_during_flight_keeps_input() {
        let (mut model, client, mut net_rx) = test_model();
        model
            .state
            .session
            .apply_upload("sales.csv", MockClient::schema_for(&["sales.csv"]));
        model.state.session.set_view(ViewMode::Chat);
        client.push_reply(Err(ClientApiError::Transport("boom".to_string())));

        type_text(&mut model, "first").await;
        model.update(key(KeyCode::Enter)).await;
        type_text(&mut model, "second").await;
        model.update(key(KeyCode::Enter)).await;

        // The second attempt is a no-op: not queued, text preserved
        assert_eq!(model.state.question_input, "second");
        assert_eq!(model.state.chat.messages().len(), 1);

        let net = net_rx.recv().await.expect("query outcome");
        model.update(Msg::Net(net)).await;
        assert_eq!(model.state.chat.messages().len(), 2);
    }

    #[tokio::test]
    async fn probe_failure_marks_server_offline() {
        let (mut model, client, mut net_rx) = test_model();
        client.push_probe(Err(ClientApiError::Transport(
            "connection refused".to_string(),
        )));

        model.spawn_probe();
        let net = net_rx.recv().await.expect("probe outcome");
        model.update(Msg::Net(net)).await;

        assert_eq!(model.state.server_online, Some(false));
        assert_eq!(
            model.state.notice.as_deref(),
            Some(SERVER_UNREACHABLE_NOTICE)
        );
    }

    #[tokio::test]
    async fn suggestion_prefills_the_input() {
        let (mut model, _client, _net_rx) = test_model();
        model
            .state
            .session
            .apply_upload("sales.csv", MockClient::schema_for(&["sales.csv"]));
        model.state.session.set_view(ViewMode::Chat);

        model.update(key(KeyCode::Down)).await;
        model.update(key(KeyCode::Tab)).await;

        assert_eq!(model.state.question_input, SUGGESTED_QUESTIONS[1]);
    }

    #[tokio::test]
    async fn removal_failure_is_a_notice_not_a_crash() {
        let (mut model, client, _net_rx) = test_model();
        model
            .state
            .session
            .apply_upload("sales.csv", MockClient::schema_for(&["sales.csv"]));
        client.push_removal(Err(ClientApiError::Api {
            message: "table is busy".to_string(),
            suggestion: None,
        }));

        model.update(key(KeyCode::Tab)).await; // pending
        model.update(key(KeyCode::Tab)).await; // tables
        model.update(key(KeyCode::Delete)).await;

        assert_eq!(
            model.state.notice.as_deref(),
            Some("Failed to remove file: table is busy")
        );
        assert_eq!(model.state.session.tables(), ["sales.csv"]);
    }

    #[tokio::test]
    async fn rejected_candidates_raise_the_skip_notice() {
        let (mut model, _client, _net_rx) = test_model();

        model.stage_candidates(vec![
            PendingFile::new("notes.txt", b"x".to_vec()),
            PendingFile::new("data.csv", b"y".to_vec()),
        ]);

        assert_eq!(model.state.notice.as_deref(), Some(SKIPPED_FILES_NOTICE));
        assert_eq!(model.state.staging.pending().len(), 1);
    }
}
