//! Messages that drive the TUI state machine
//!
//! All external stimuli are funneled into these typed messages
//! that are consumed by the Model's update(msg) method.

use crossterm::event::{Event as CrosstermEvent, KeyEvent};
use dc_client_api::ClientApiError;
use dc_rest_api_contract::QueryReply;

/// Messages that can be sent to the TUI state machine
#[derive(Debug, Clone)]
pub enum Msg {
    /// Keyboard input event
    Key(KeyEvent),
    /// Time tick event (driven by fake time in tests)
    Tick,
    /// Network event (settled request outcomes)
    Net(NetMsg),
    /// Quit the application
    Quit,
}

/// Settled outcomes of requests that run off the event loop
#[derive(Debug, Clone)]
pub enum NetMsg {
    /// Outcome of the startup liveness probe
    Probe(Result<(), ClientApiError>),
    /// Outcome of a spawned question submission
    Query(Result<QueryReply, ClientApiError>),
}

/// Convert crossterm events to our Msg types
impl From<CrosstermEvent> for Msg {
    fn from(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key_event) => Msg::Key(key_event),
            // Other event types could be mapped here if needed
            _ => Msg::Tick,
        }
    }
}
