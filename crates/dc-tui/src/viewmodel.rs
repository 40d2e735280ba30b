//! ViewModel layer - derived presentation state shaped for rendering
//!
//! The ViewModel transforms domain state into presentation-ready data
//! (strings, selection flags, rendered tables) that the View can consume.

use chrono::{DateTime, Local};
use dc_core::{render_table, Message, RenderedTable, ViewMode, SUGGESTED_QUESTIONS};

use crate::app::{AppState, ManagerFocus};

/// Connection indicator derived from the probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Probing,
    Connected,
    Disconnected,
}

impl ServerStatus {
    pub fn label(self) -> &'static str {
        match self {
            ServerStatus::Probing => "Connecting...",
            ServerStatus::Connected => "Connected",
            ServerStatus::Disconnected => "Disconnected",
        }
    }
}

/// One conversation entry shaped for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub sender: &'static str,
    pub time: String,
    pub body: MessageBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// The user's question text
    Question(String),
    /// A successful answer: generated query, prose, optional result table
    Answer {
        sql: String,
        explanation: String,
        table: Option<RenderedTable>,
    },
    /// An error reply with an optional remediation hint
    Failure {
        message: String,
        suggestion: Option<String>,
    },
}

impl MessageView {
    fn from_message(message: &Message) -> Self {
        match message {
            Message::User { content, at } => Self {
                sender: "You",
                time: clock_label(at),
                body: MessageBody::Question(content.clone()),
            },
            Message::Assistant {
                sql,
                explanation,
                rows,
                at,
            } => Self {
                sender: "DataChat AI",
                time: clock_label(at),
                body: MessageBody::Answer {
                    sql: sql.clone(),
                    explanation: explanation.clone(),
                    table: render_table(rows),
                },
            },
            Message::Error {
                message,
                suggestion,
                at,
            } => Self {
                sender: "DataChat AI",
                time: clock_label(at),
                body: MessageBody::Failure {
                    message: message.clone(),
                    suggestion: suggestion.clone(),
                },
            },
        }
    }
}

fn clock_label(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// ViewModel represents the presentation state derived from the Model
/// This is what the UI rendering code consumes - pure data, no business logic
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub view: ViewMode,
    pub server_status: ServerStatus,
    /// Committed table names, in upload completion order
    pub tables: Vec<String>,
    /// Staged file names awaiting commit
    pub pending: Vec<String>,
    pub manager_focus: ManagerFocus,
    pub selected_pending: usize,
    pub selected_table: usize,
    pub path_input: String,
    pub question_input: String,
    /// Whether a query is in flight (input disabled, indicator shown)
    pub submitting: bool,
    pub messages: Vec<MessageView>,
    /// Starter questions, present only while the log is empty
    pub suggestions: Vec<&'static str>,
    pub selected_suggestion: usize,
    /// Whether the clear-chat affordance is active
    pub can_clear: bool,
    pub notice: Option<String>,
}

impl ViewModel {
    /// Create a ViewModel from the current AppState
    pub fn from_state(state: &AppState) -> Self {
        let messages = state
            .chat
            .messages()
            .iter()
            .map(MessageView::from_message)
            .collect();
        let suggestions = if state.chat.is_empty() {
            SUGGESTED_QUESTIONS.to_vec()
        } else {
            Vec::new()
        };

        Self {
            view: state.session.view(),
            server_status: match state.server_online {
                None => ServerStatus::Probing,
                Some(true) => ServerStatus::Connected,
                Some(false) => ServerStatus::Disconnected,
            },
            tables: state.session.tables().to_vec(),
            pending: state
                .staging
                .pending()
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            manager_focus: state.manager_focus,
            selected_pending: state.selected_pending,
            selected_table: state.selected_table,
            path_input: state.path_input.clone(),
            question_input: state.question_input.clone(),
            submitting: state.chat.is_submitting(),
            messages,
            suggestions,
            selected_suggestion: state.selected_suggestion,
            can_clear: !state.chat.is_empty(),
            notice: state.notice.clone(),
        }
    }

    /// The newest entry, if any (useful for assertions)
    pub fn last_message(&self) -> Option<&MessageView> {
        self.messages.last()
    }
}
