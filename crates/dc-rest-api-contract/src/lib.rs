//! DataChat REST API contract types
//!
//! This crate defines the schema types for the DataChat analysis service
//! REST API. These types are shared between the REST client, the mock
//! client, and the orchestration core.

pub mod types;

pub use types::*;
