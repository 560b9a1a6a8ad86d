//! Error taxonomy for the agent orchestration core.
//!
//! Every variant here is either (a) caught at a tool handler boundary and
//! turned into an `"Error: ..."` tool-result string, never propagating past
//! [`forgecode_tools::registry::ToolRegistry::execute`], or (b) one of the
//! two kinds the turn loop itself reacts to: `TransportFailure` ends the
//! current turn, `UserInterrupt` ends it cleanly with a notification.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Path escapes workspace: {path}")]
    WorkspaceEscape { path: String },

    #[error("Dangerous command blocked")]
    DangerousCommand,

    #[error("Command timed out ({secs}s)")]
    ToolTimeout { secs: u64 },

    #[error("Invalid regex pattern: {pattern}")]
    InvalidRegex { pattern: String },

    #[error("{0}")]
    ValidationError(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown skill '{name}'. Available skills: {available}")]
    UnknownSkill { name: String, available: String },

    #[error("Unknown agent type '{0}'")]
    UnknownAgentType(String),

    #[error("Text not found in {path}")]
    EditTextNotFound { path: String },

    #[error("{0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("interrupted")]
    UserInterrupt,

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Render as the plain `"Error: ..."` string a tool handler returns to the model.
    pub fn to_tool_result(&self) -> String {
        format!("Error: {self}")
    }
}
