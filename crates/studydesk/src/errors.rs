use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a study tool. The message is what the user gets to see.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ToolError {
    /// Input was missing or malformed, nothing was sent
    #[error("{0}")]
    Validation(String),

    #[error("A request is already in progress for this tool")]
    Busy,

    /// The provider could not be set up, usually a missing credential
    #[error("{0}")]
    Initialization(String),

    /// The provider call failed or returned something unusable
    #[error("{0}")]
    Gateway(String),
}

pub type ToolResult<T> = Result<T, ToolError>;
