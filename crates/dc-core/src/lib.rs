//! Session, upload and conversation orchestration for the DataChat client.
//!
//! Everything here is a pure state struct with explicit transition
//! functions; the only effectful edge is the `ClientApi` trait the upload
//! and removal orchestrators call through. Terminal concerns live in the
//! front-end crate.

pub mod chat;
pub mod render;
pub mod session;
pub mod upload;

/// Conversation log, submission state machine and the message variants.
pub use chat::{
    Conversation, Message, SubmitError, SubmitStatus, SUGGESTED_QUESTIONS,
    TRANSPORT_ERROR_MESSAGE,
};

/// Result-table formatting rules.
pub use render::{columns_of, format_value, header_label, render_table, RenderedTable};

/// Committed tables, schema and view mode.
pub use session::{SessionState, ViewMode};

/// Staged selection, sequential batch commit and removal.
pub use upload::{
    remove_table, BatchFailure, BatchReport, PendingFile, RemoveError, Selection, UploadStaging,
};
