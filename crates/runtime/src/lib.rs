//! Relay runtime: the tool-calling agent and everything around it.
//!
//! # Overview
//!
//! - **Agent**: a reason/act loop over a [`Backend`] and a [`ToolHost`],
//!   bounded by a recursion limit.
//! - **Orchestrator**: connects to the configured MCP servers, builds the
//!   tool catalog and system prompt, and turns a runaway loop into a fixed
//!   apology.
//! - **ChatSession**: the transcript plus a single-slot [`AgentCache`].
//! - **Providers**: the Groq (OpenAI-compatible) backend.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{ChatSession, McpConnector, OrchestratorConfig, ProviderConfig};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = ProviderConfig::default().backend_from_env()?;
//! let mut session = ChatSession::new(McpConnector::new(backend, OrchestratorConfig::default()));
//! let reply = session.send("what's (3 + 5) x 12?").await;
//! println!("{}", reply.content);
//! # Ok(())
//! # }
//! ```

pub mod agent;
mod cache;
mod error;
pub mod model;
pub mod orchestrator;
pub mod providers;
mod session;
pub mod tools;

#[cfg(test)]
mod testing;

pub use agent::{Agent, DEFAULT_RECURSION_LIMIT, RunConfig};
pub use cache::AgentCache;
pub use error::{Error, Result};
pub use model::{Backend, Message, ModelError, Role, ToolCall, ToolResult, ToolSpec};
pub use orchestrator::{
    Ask, Connect, DEFAULT_SYSTEM_PROMPT, McpConnector, Orchestrator, OrchestratorConfig,
    RECURSION_APOLOGY, WEATHER_SERVER_URL, WEATHER_TOOL, default_servers,
};
pub use providers::{GroqBackend, ProviderConfig};
pub use session::{ChatSession, TranscriptEntry};
pub use tools::{McpToolHost, ServerConfig, ToolHost};
