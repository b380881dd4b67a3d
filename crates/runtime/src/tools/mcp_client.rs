//! MCP (Model Context Protocol) client integration.
//!
//! This module provides MCP server connections using the official rmcp SDK,
//! over either a spawned child process (stdio) or streamable HTTP.
//!
//! # Example
//!
//! ```ignore
//! use runtime::tools::McpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = McpClient::spawn("math-server", Vec::<String>::new(), &Default::default()).await?;
//!
//! let tools = client.list_tools().await?;
//! for tool in &tools {
//!     println!("Tool: {}", tool.name);
//! }
//! # Ok(())
//! # }
//! ```

use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, JsonObject},
    service::{RoleClient, RunningService},
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
};
use std::collections::HashMap;
use tokio::process::Command;

pub use rmcp::model::{CallToolResult, Tool};

/// Error type for MCP operations.
pub type McpError = Box<dyn std::error::Error + Send + Sync>;

/// An MCP client connected to one server.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Spawn an MCP server process and connect to it over stdio.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to run (e.g., "math-server")
    /// * `args` - Arguments to pass to the command
    /// * `env` - Extra environment variables for the child
    pub async fn spawn(
        command: impl AsRef<str>,
        args: impl IntoIterator<Item = impl AsRef<str>>,
        env: &HashMap<String, String>,
    ) -> Result<Self, McpError> {
        let command_str = command.as_ref().to_string();
        let args_vec: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();

        let transport = TokioChildProcess::new(Command::new(&command_str).configure(|cmd| {
            cmd.args(&args_vec).envs(env);
        }))?;

        let service = ().serve(transport).await?;
        Ok(Self { service })
    }

    /// Connect to a server exposed over streamable HTTP.
    pub async fn connect_http(url: impl AsRef<str>) -> Result<Self, McpError> {
        let transport = StreamableHttpClientTransport::from_uri(url.as_ref().to_string());
        let service = ().serve(transport).await?;
        Ok(Self { service })
    }

    /// List every tool the server advertises.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        Ok(self.service.list_all_tools().await?)
    }

    /// Call a tool with the given name and arguments.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let params = CallToolRequestParams {
            name: name.into().into(),
            arguments,
            meta: None,
            task: None,
        };

        Ok(self.service.call_tool(params).await?)
    }

    /// Close the session. Stdio servers are terminated with it.
    pub async fn shutdown(self) -> Result<(), McpError> {
        self.service.cancel().await?;
        Ok(())
    }
}
