//! The conversation engine: an append-only message log plus the
//! one-query-in-flight submission state machine.

use chrono::{DateTime, Local};
use dc_client_api::ClientApiError;
use dc_rest_api_contract::{QueryReply, Row};
use thiserror::Error;
use tracing::debug;

/// Shown in place of server detail when no usable response came back.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Failed to process your question";

/// Starter questions offered while the log is empty.
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "What are the total sales in 2024?",
    "Show me the best-selling products",
    "What is the average order value?",
    "Compare January and February sales",
];

/// One immutable entry in the conversation log.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The user's question, echoed optimistically at submission time.
    User {
        content: String,
        at: DateTime<Local>,
    },
    /// A successful reply: generated query, prose explanation, result rows.
    Assistant {
        sql: String,
        explanation: String,
        rows: Vec<Row>,
        at: DateTime<Local>,
    },
    /// An application or transport failure, kept in the log like any reply.
    Error {
        message: String,
        suggestion: Option<String>,
        at: DateTime<Local>,
    },
}

impl Message {
    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            Message::User { at, .. }
            | Message::Assistant { at, .. }
            | Message::Error { at, .. } => *at,
        }
    }
}

/// Submission phase. At most one query is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
}

/// Local rejection of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The trimmed question was empty. Nothing is appended, nothing sent.
    #[error("question is empty")]
    EmptyQuestion,
    /// A query is already in flight. The attempt is dropped, not queued.
    #[error("a query is already in flight")]
    InFlight,
}

/// The append-only conversation log and its submission state machine.
///
/// Messages are never reordered or mutated in place; the log order is the
/// order in which submissions and their responses settled.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    status: SubmitStatus,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    /// Accept or reject a submission attempt.
    ///
    /// On acceptance the user message is appended immediately, the engine
    /// moves to `Submitting`, and the trimmed question is returned; the
    /// caller owns actually issuing the request.
    pub fn begin_submit(
        &mut self,
        input: &str,
        at: DateTime<Local>,
    ) -> Result<String, SubmitError> {
        let question = input.trim();
        if question.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }

        self.messages.push(Message::User {
            content: question.to_string(),
            at,
        });
        self.status = SubmitStatus::Submitting;
        Ok(question.to_string())
    }

    /// Fold a settled query outcome into the log and return to `Idle`.
    ///
    /// Application errors keep the server's wording and suggestion
    /// verbatim; transport failures get the fixed generic message and no
    /// suggestion. Both arms reset the status, so input is never left
    /// permanently disabled.
    pub fn settle(&mut self, outcome: Result<QueryReply, ClientApiError>, at: DateTime<Local>) {
        let message = match outcome {
            Ok(reply) => Message::Assistant {
                sql: reply.sql_query,
                explanation: reply.explanation,
                rows: reply.data,
                at,
            },
            Err(ClientApiError::Api {
                message,
                suggestion,
            }) => Message::Error {
                message,
                suggestion,
                at,
            },
            Err(ClientApiError::Transport(detail)) => {
                debug!(%detail, "query transport failure");
                Message::Error {
                    message: TRANSPORT_ERROR_MESSAGE.to_string(),
                    suggestion: None,
                    at,
                }
            }
        };
        self.messages.push(message);
        self.status = SubmitStatus::Idle;
    }

    /// Empty the log unconditionally.
    ///
    /// An in-flight query is not cancelled: its response is appended to the
    /// emptied log when it settles. Documented quirk, kept on purpose.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(sql: &str) -> QueryReply {
        QueryReply {
            sql_query: sql.to_string(),
            explanation: "Sales were strong.".to_string(),
            data: Vec::new(),
            row_count: None,
        }
    }

    #[test]
    fn whitespace_question_appends_nothing() {
        let mut chat = Conversation::new();
        let err = chat.begin_submit("   \t ", Local::now()).unwrap_err();

        assert_eq!(err, SubmitError::EmptyQuestion);
        assert!(chat.is_empty());
        assert!(!chat.is_submitting());
    }

    #[test]
    fn submission_trims_and_echoes_the_question() {
        let mut chat = Conversation::new();
        let question = chat
            .begin_submit("  total sales?  ", Local::now())
            .expect("submission should be accepted");

        assert_eq!(question, "total sales?");
        assert!(chat.is_submitting());
        assert!(
            matches!(chat.messages(), [Message::User { content, .. }] if content == "total sales?")
        );
    }

    #[test]
    fn second_submission_while_in_flight_is_dropped() {
        let mut chat = Conversation::new();
        chat.begin_submit("first", Local::now()).unwrap();

        let err = chat.begin_submit("second", Local::now()).unwrap_err();
        assert_eq!(err, SubmitError::InFlight);
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn successful_reply_settles_verbatim_and_reopens_input() {
        let mut chat = Conversation::new();
        chat.begin_submit("total sales?", Local::now()).unwrap();
        chat.settle(Ok(reply("SELECT SUM(amount) FROM sales")), Local::now());

        assert!(!chat.is_submitting());
        match chat.messages() {
            [Message::User { .. }, Message::Assistant {
                sql, explanation, ..
            }] => {
                assert_eq!(sql, "SELECT SUM(amount) FROM sales");
                assert_eq!(explanation, "Sales were strong.");
            }
            other => panic!("unexpected log: {other:?}"),
        }

        assert!(chat.begin_submit("again?", Local::now()).is_ok());
    }

    #[test]
    fn application_error_keeps_message_and_suggestion_verbatim() {
        let mut chat = Conversation::new();
        chat.begin_submit("bad question", Local::now()).unwrap();
        chat.settle(
            Err(ClientApiError::Api {
                message: "no such column".into(),
                suggestion: Some("try 'amount' instead".into()),
            }),
            Local::now(),
        );

        match chat.messages().last() {
            Some(Message::Error {
                message,
                suggestion,
                ..
            }) => {
                assert_eq!(message, "no such column");
                assert_eq!(suggestion.as_deref(), Some("try 'amount' instead"));
            }
            other => panic!("unexpected tail: {other:?}"),
        }
    }

    #[test]
    fn transport_failure_gets_the_generic_message_without_suggestion() {
        let mut chat = Conversation::new();
        chat.begin_submit("anything", Local::now()).unwrap();
        chat.settle(
            Err(ClientApiError::Transport("connection refused".into())),
            Local::now(),
        );

        match chat.messages().last() {
            Some(Message::Error {
                message,
                suggestion,
                ..
            }) => {
                assert_eq!(message, TRANSPORT_ERROR_MESSAGE);
                assert!(suggestion.is_none());
            }
            other => panic!("unexpected tail: {other:?}"),
        }
    }

    #[test]
    fn clearing_during_flight_still_appends_the_late_response() {
        let mut chat = Conversation::new();
        chat.begin_submit("slow question", Local::now()).unwrap();

        chat.clear();
        assert!(chat.is_empty());
        assert!(chat.is_submitting());

        chat.settle(Ok(reply("SELECT 1")), Local::now());
        assert_eq!(chat.messages().len(), 1);
        assert!(matches!(chat.messages(), [Message::Assistant { .. }]));
        assert!(!chat.is_submitting());
    }
}
