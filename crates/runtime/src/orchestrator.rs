//! Agent wiring: servers, catalog, model and prompt.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::agent::{Agent, RunConfig};
use crate::model::{Backend, Message};
use crate::tools::{McpToolHost, ServerConfig, ToolHost};
use crate::{Error, Result};

/// The tool the system prompt promises the model.
pub const WEATHER_TOOL: &str = "get_weather";

/// Placeholder in a system prompt template replaced by the tool names.
pub const TOOLS_PLACEHOLDER: &str = "{tools}";

/// Returned instead of an error when a turn hits the recursion limit.
pub const RECURSION_APOLOGY: &str = "I got stuck in a loop. Please try rephrasing your question. \
For weather queries, try: 'Get weather for New York' or 'What's the weather in New York?'";

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You have access to real-time weather data through the get_weather tool.

Available tools: {tools}

Instructions:
1. When asked about the weather, temperature or climate anywhere, call get_weather with the location.
2. Never claim you lack weather access; call the tool instead.
3. For "weather in San Francisco", call get_weather with location "San Francisco".
4. For arithmetic, call one tool at a time with concrete numbers and feed each result into the next call.
5. Report tool results directly to the user.

Tool format: get_weather(location) where location is a city or place name."#;

pub const MATH_SERVER_COMMAND: &str = "math-server";
pub const WEATHER_SERVER_URL: &str = "http://localhost:8000/mcp";

/// The math server over stdio and the weather server over HTTP.
pub fn default_servers() -> BTreeMap<String, ServerConfig> {
    BTreeMap::from([
        (
            "math".to_string(),
            ServerConfig::stdio(math_server_command(), Vec::<String>::new()),
        ),
        (
            "weather".to_string(),
            ServerConfig::streamable_http(WEATHER_SERVER_URL),
        ),
    ])
}

/// `math-server` next to the running executable, else whatever PATH finds.
fn math_server_command() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(|dir| sibling_command(dir, MATH_SERVER_COMMAND)))
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| MATH_SERVER_COMMAND.to_string())
}

fn sibling_command(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
    path.is_file().then_some(path)
}

/// Everything needed to assemble an orchestrator apart from the model.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub servers: BTreeMap<String, ServerConfig>,
    /// System prompt template; `{tools}` is replaced by the tool names.
    pub system_prompt: Option<String>,
    pub run: RunConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            system_prompt: None,
            run: RunConfig::default(),
        }
    }
}

/// Substitute the tool names into a system prompt template.
pub fn render_system_prompt(template: &str, tool_names: &[String]) -> String {
    template.replace(TOOLS_PLACEHOLDER, &tool_names.join(", "))
}

/// Something that answers a conversation with text.
pub trait Ask: Send + Sync {
    /// Answer the conversation. The last message is the newest user turn.
    fn ask(&self, conversation: Vec<Message>) -> impl Future<Output = Result<String>> + Send;

    /// Tools the answerer can call.
    fn tool_names(&self) -> Vec<String>;
}

/// Something that can build an [`Ask`] from scratch.
pub trait Connect: Send + Sync {
    type Agent: Ask;

    fn connect(&self) -> impl Future<Output = Result<Self::Agent>> + Send;
}

/// A reasoning agent plus the per-invocation settings it runs with.
pub struct Orchestrator<B, H> {
    agent: Agent<B, H>,
    run: RunConfig,
}

impl<B: Backend, H: ToolHost> Orchestrator<B, H> {
    /// Bind a model to an already-fetched catalog.
    ///
    /// A catalog without [`WEATHER_TOOL`] is accepted; weather questions
    /// simply cannot be answered.
    pub fn new(backend: B, tools: H, system_prompt: Option<&str>, run: RunConfig) -> Self {
        let tool_names = tools.tool_names();
        tracing::info!(tools = ?tool_names, "available tools");
        if !tools.has_tool(WEATHER_TOOL) {
            tracing::warn!(
                tools = ?tool_names,
                "{WEATHER_TOOL} tool not found in loaded tools"
            );
        }

        let mut agent = Agent::new(backend, tools);
        if let Some(template) = system_prompt {
            agent = agent.with_system(render_system_prompt(template, &tool_names));
        }
        Self { agent, run }
    }

    pub fn agent(&self) -> &Agent<B, H> {
        &self.agent
    }
}

impl<B: Backend> Orchestrator<B, McpToolHost> {
    /// Connect to every configured server, then build the agent.
    pub async fn connect(backend: B, config: &OrchestratorConfig) -> Self {
        let tools = McpToolHost::connect(&config.servers).await;
        Self::new(
            backend,
            tools,
            config.system_prompt.as_deref(),
            config.run.clone(),
        )
    }

    /// Close every server connection and stop spawned servers.
    pub async fn shutdown(self) {
        self.agent.into_tools().shutdown().await;
    }
}

impl<B: Backend, H: ToolHost> Ask for Orchestrator<B, H> {
    async fn ask(&self, conversation: Vec<Message>) -> Result<String> {
        match self.agent.invoke(conversation, &self.run).await {
            Ok(messages) => Ok(messages.last().map(Message::text).unwrap_or_default()),
            Err(Error::RecursionLimit(limit)) => {
                tracing::warn!(limit, "recursion limit reached");
                Ok(RECURSION_APOLOGY.to_string())
            }
            Err(e) => Err(e),
        }
    }

    fn tool_names(&self) -> Vec<String> {
        self.agent.tools().tool_names()
    }
}

/// Builds MCP-backed orchestrators from a fixed model and configuration.
pub struct McpConnector<B> {
    backend: B,
    config: OrchestratorConfig,
}

impl<B> McpConnector<B> {
    pub fn new(backend: B, config: OrchestratorConfig) -> Self {
        Self { backend, config }
    }
}

impl<B: Backend + Clone> Connect for McpConnector<B> {
    type Agent = Orchestrator<B, McpToolHost>;

    async fn connect(&self) -> Result<Self::Agent> {
        Ok(Orchestrator::connect(self.backend.clone(), &self.config).await)
    }
}
