//! Main TUI application logic

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dc_client_api::ClientApi;
use dc_core::{Conversation, SessionState, UploadStaging};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::error::TuiResult;
use crate::event::{Event, EventHandler};
use crate::model::Model;
use crate::msg::{Msg, NetMsg};
use crate::ui;
use crate::viewmodel::ViewModel;

/// Focused pane within the upload manager view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerFocus {
    #[default]
    PathInput,
    Pending,
    Tables,
}

/// Application state
#[derive(Debug)]
pub struct AppState {
    // Domain state
    pub session: SessionState,
    pub staging: UploadStaging,
    pub chat: Conversation,

    // Text inputs
    pub question_input: String,
    pub path_input: String,

    // Selection cursors
    pub manager_focus: ManagerFocus,
    pub selected_pending: usize,
    pub selected_table: usize,
    pub selected_suggestion: usize,

    // Connection and notices
    pub server_online: Option<bool>,
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(allow_pdf: bool) -> Self {
        Self {
            session: SessionState::new(),
            staging: UploadStaging::new(allow_pdf),
            chat: Conversation::new(),
            question_input: String::new(),
            path_input: String::new(),
            manager_focus: ManagerFocus::default(),
            selected_pending: 0,
            selected_table: 0,
            selected_suggestion: 0,
            server_online: None,
            notice: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Main TUI application
pub struct App<C: ClientApi + 'static> {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    event_handler: EventHandler,
    model: Model<C>,
    net_rx: mpsc::UnboundedReceiver<NetMsg>,
}

impl<C: ClientApi + 'static> App<C> {
    /// Create a new TUI application
    pub fn new(client: Arc<C>, allow_pdf: bool) -> TuiResult<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let event_handler = EventHandler::new();
        let (net_tx, net_rx) = mpsc::unbounded_channel();
        let model = Model::with_state(AppState::new(allow_pdf), client, net_tx);

        Ok(Self {
            terminal,
            event_handler,
            model,
            net_rx,
        })
    }

    /// Stage files named on the command line before the first draw
    pub fn stage_initial(&mut self, paths: &[PathBuf]) {
        self.model.stage_paths(paths);
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> TuiResult<()> {
        // Start event handling and probe the server once
        self.event_handler.run().await;
        self.model.spawn_probe();

        loop {
            // Draw the UI from a fresh view model
            let view_model = ViewModel::from_state(&self.model.state);
            self.terminal.draw(|f| {
                ui::draw_root(f, f.area(), &view_model);
            })?;

            // Handle input events and settled network outcomes
            tokio::select! {
                event = self.event_handler.next() => match event {
                    Some(Event::Quit) | None => break,
                    Some(Event::Input(input)) => {
                        self.model.update(Msg::from(input)).await;
                    }
                    Some(Event::Tick) => {
                        self.model.update(Msg::Tick).await;
                    }
                    Some(Event::Error(e)) => {
                        self.model.state.notice = Some(format!("Event error: {e}"));
                    }
                },
                Some(net) = self.net_rx.recv() => {
                    self.model.update(Msg::Net(net)).await;
                }
            }
        }

        Ok(())
    }
}

impl<C: ClientApi + 'static> Drop for App<C> {
    fn drop(&mut self) {
        // Cleanup terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
