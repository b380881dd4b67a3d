//! Tool host trait.

use crate::model::{ToolCall, ToolSpec};
use crate::tools::ToolError;
use serde_json::Value;
use std::future::Future;

/// Trait for tool execution hosts.
///
/// The host owns the tool catalog the agent was built with. This is the
/// boundary between the model loop and side effects.
pub trait ToolHost: Send + Sync {
    /// Get available tool specifications.
    fn specs(&self) -> &[ToolSpec];

    /// Execute a tool call.
    fn execute(&self, call: &ToolCall) -> impl Future<Output = Result<Value, ToolError>> + Send;

    /// Names of every tool in the catalog, in registration order.
    fn tool_names(&self) -> Vec<String> {
        self.specs().iter().map(|spec| spec.name.clone()).collect()
    }

    /// Whether the catalog contains a tool with this name.
    fn has_tool(&self, name: &str) -> bool {
        self.specs().iter().any(|spec| spec.name == name)
    }
}
