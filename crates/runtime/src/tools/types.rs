//! Tool-related types.

use crate::model::ToolSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How to reach one MCP tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum ServerConfig {
    /// Launch a local process and speak MCP over its stdin/stdout.
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
    },
    /// Connect to a running server over streamable HTTP.
    StreamableHttp { url: String },
}

impl ServerConfig {
    pub fn stdio(
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Stdio {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: HashMap::new(),
        }
    }

    pub fn streamable_http(url: impl Into<String>) -> Self {
        Self::StreamableHttp { url: url.into() }
    }
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio { command, args, .. } if args.is_empty() => write!(f, "stdio: {command}"),
            Self::Stdio { command, args, .. } => {
                write!(f, "stdio: {command} {}", args.join(" "))
            }
            Self::StreamableHttp { url } => write!(f, "streamable_http: {url}"),
        }
    }
}

/// A tool with its source server.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTool {
    /// The tool definition as advertised by the server.
    pub spec: ToolSpec,
    /// Name of the MCP server providing this tool.
    pub server_name: String,
}
