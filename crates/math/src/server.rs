//! MCP service exposing `add` and `multiply`.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, schemars, tool, tool_handler, tool_router};
use serde::Deserialize;

/// Two operands.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct Operands {
    pub a: f64,
    pub b: f64,
}

#[derive(Clone)]
pub struct MathServer {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MathServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Add two numbers")]
    fn add(&self, Parameters(Operands { a, b }): Parameters<Operands>) -> String {
        tracing::debug!(a, b, "add");
        (a + b).to_string()
    }

    #[tool(description = "Multiply two numbers")]
    fn multiply(&self, Parameters(Operands { a, b }): Parameters<Operands>) -> String {
        tracing::debug!(a, b, "multiply");
        (a * b).to_string()
    }
}

impl Default for MathServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for MathServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Basic arithmetic: add and multiply.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
