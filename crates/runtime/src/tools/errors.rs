use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// These never abort a turn; the agent hands them back to the model as a
/// failed tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("server unavailable: {0}")]
    Unavailable(String),
    #[error("execution failed: {0}")]
    Execution(String),
}
