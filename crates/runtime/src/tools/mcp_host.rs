//! MCP-backed tool host.

use super::{
    CallToolResult, McpClient, McpError, ServerConfig, ToolCatalog, ToolError, ToolHost,
};
use crate::model::{ToolCall, ToolSpec};
use rmcp::model::JsonObject;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Tool host backed by one or more MCP servers.
///
/// The catalog is fetched once, at connect time, and never refreshed.
pub struct McpToolHost {
    clients: HashMap<String, McpClient>,
    catalog: ToolCatalog,
}

impl McpToolHost {
    /// Connect to every configured server and fetch its tools.
    ///
    /// A server that cannot be reached is logged and left out of the
    /// catalog; the remaining servers still load.
    pub async fn connect(servers: &BTreeMap<String, ServerConfig>) -> Self {
        let mut clients = HashMap::new();
        let mut catalog = ToolCatalog::new();

        for (name, config) in servers {
            match connect_server(config).await {
                Ok((client, specs)) => {
                    let added = catalog.register(name, specs);
                    tracing::info!(server = %name, %config, tools = added, "connected MCP server");
                    clients.insert(name.clone(), client);
                }
                Err(e) => {
                    tracing::warn!(server = %name, %config, error = %e, "failed to initialize MCP server");
                }
            }
        }

        Self { clients, catalog }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Close every server session.
    pub async fn shutdown(self) {
        for (name, client) in self.clients {
            if let Err(e) = client.shutdown().await {
                tracing::debug!(server = %name, error = %e, "MCP server shutdown failed");
            }
        }
    }
}

async fn connect_server(config: &ServerConfig) -> Result<(McpClient, Vec<ToolSpec>), McpError> {
    let client = match config {
        ServerConfig::Stdio { command, args, env } => McpClient::spawn(command, args, env).await?,
        ServerConfig::StreamableHttp { url } => McpClient::connect_http(url).await?,
    };
    let specs = client
        .list_tools()
        .await?
        .into_iter()
        .map(ToolSpec::from)
        .collect();
    Ok((client, specs))
}

/// Tool arguments in the shape MCP expects: a JSON object, or nothing.
pub(crate) fn tool_arguments(input: &Value) -> Result<Option<JsonObject>, ToolError> {
    match input {
        Value::Object(map) => Ok(Some(map.clone())),
        Value::Null => Ok(None),
        other => Err(ToolError::InvalidInput(format!(
            "expected a JSON object of arguments, got {other}"
        ))),
    }
}

impl ToolHost for McpToolHost {
    fn specs(&self) -> &[ToolSpec] {
        self.catalog.specs()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let registered = self
            .catalog
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        let client = self
            .clients
            .get(&registered.server_name)
            .ok_or_else(|| ToolError::Unavailable(registered.server_name.clone()))?;

        let arguments = tool_arguments(&call.input)?;
        let result = client
            .call_tool(&call.name, arguments)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        tool_output(result)
    }
}

/// Join the text content; a result flagged as an error becomes one.
fn tool_output(result: CallToolResult) -> Result<Value, ToolError> {
    let text = result
        .content
        .iter()
        .filter_map(|content| content.as_text())
        .map(|text| text.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error.unwrap_or(false) {
        return Err(ToolError::Execution(text));
    }
    Ok(Value::String(text))
}
