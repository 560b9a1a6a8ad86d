//! Shared types, error taxonomy, and configuration for the agent orchestration core.

pub mod config;
pub mod error;
pub mod types;
pub mod ui;

pub use config::Settings;
pub use error::{Error, Result};
pub use types::*;
pub use ui::{NullSink, Style, UiSink};
