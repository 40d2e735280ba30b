//! Terminal client for the DataChat analysis service

pub mod app;
pub mod error;
pub mod event;
pub mod files;
pub mod golden;
pub mod model;
pub mod msg;
pub mod test_runtime;
pub mod ui;
pub mod viewmodel;

pub use app::{App, AppState, ManagerFocus};
pub use error::{TuiError, TuiResult};
pub use event::{Event, EventHandler};
pub use model::Model;
pub use msg::{Msg, NetMsg};
pub use test_runtime::{execute_scenario, TestRuntime};
pub use viewmodel::{ServerStatus, ViewModel};
