//! Configuration loading from relay.toml.
//!
//! Every section is optional. Credentials are never read from here; they
//! come from the environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use runtime::{
    DEFAULT_SYSTEM_PROMPT, OrchestratorConfig, ProviderConfig, RunConfig, ServerConfig,
    WEATHER_SERVER_URL, default_servers,
};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "relay.toml";
pub const CONFIG_ENV: &str = "RELAY_CONFIG";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Model provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// MCP servers by name. Replaces the defaults entirely when present.
    #[serde(default = "default_servers")]
    pub servers: BTreeMap<String, ServerConfig>,

    #[serde(default)]
    pub agent: AgentConfig,
}

/// Agent settings that override the per-command defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AgentConfig {
    /// System prompt template; `{tools}` expands to the tool names.
    pub system_prompt: Option<String>,
    pub recursion_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            servers: default_servers(),
            agent: AgentConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `--config`, then `RELAY_CONFIG`, then `./relay.toml`,
    /// falling back to the defaults when none is given.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let local = Path::new(CONFIG_FILE);
        let fallback = local.exists().then(|| local.to_path_buf());

        match explicit.or(from_env).or(fallback) {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Orchestrator settings for one command.
    ///
    /// `system_prompt` and `recursion_limit` are the command's defaults;
    /// the `[agent]` section overrides both.
    pub fn orchestrator(
        &self,
        system_prompt: Option<&str>,
        recursion_limit: usize,
    ) -> OrchestratorConfig {
        let system_prompt = self
            .agent
            .system_prompt
            .as_deref()
            .or(system_prompt)
            .map(str::to_string);
        let recursion_limit = self.agent.recursion_limit.unwrap_or(recursion_limit);
        OrchestratorConfig {
            servers: self.servers.clone(),
            system_prompt,
            run: RunConfig::default().with_recursion_limit(recursion_limit),
        }
    }

    /// The chat surface's system prompt default.
    pub fn chat_orchestrator(&self, recursion_limit: usize) -> OrchestratorConfig {
        self.orchestrator(Some(DEFAULT_SYSTEM_PROMPT), recursion_limit)
    }

    /// URL of the weather server, for the reachability check.
    pub fn weather_url(&self) -> &str {
        match self.servers.get("weather") {
            Some(ServerConfig::StreamableHttp { url }) => url,
            _ => WEATHER_SERVER_URL,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.servers, default_servers());
        assert!(config.agent.system_prompt.is_none());
        assert_eq!(config.weather_url(), "http://localhost:8000/mcp");
    }

    #[test]
    fn parses_servers_by_transport() {
        let config = Config::parse(
            r#"
            [servers.math]
            transport = "stdio"
            command = "python"
            args = ["mathserver.py"]

            [servers.weather]
            transport = "streamable_http"
            url = "http://10.0.0.5:8000/mcp"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.servers["math"],
            ServerConfig::stdio("python", ["mathserver.py"])
        );
        assert_eq!(config.weather_url(), "http://10.0.0.5:8000/mcp");
    }

    #[test]
    fn parses_provider() {
        let config = Config::parse(
            r#"
            [provider]
            model = "llama-3.3-70b-versatile"
            max_tokens = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.provider.model(), "llama-3.3-70b-versatile");
        assert_eq!(config.provider.max_tokens, Some(1024));
    }

    #[test]
    fn unknown_provider_key_is_rejected() {
        let err = Config::parse("[provider]\nprovider = \"openai\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_transport_is_rejected() {
        let err = Config::parse("[servers.x]\ntransport = \"sse\"\nurl = \"http://x\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn command_defaults_apply_without_agent_section() {
        let config = Config::default();

        let demo = config.orchestrator(None, 25);
        assert!(demo.system_prompt.is_none());
        assert_eq!(demo.run.recursion_limit, 25);
        assert_eq!(demo.run.thread_id, "1");

        let chat = config.chat_orchestrator(50);
        assert_eq!(chat.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(chat.run.recursion_limit, 50);
    }

    #[test]
    fn agent_section_overrides_command_defaults() {
        let config = Config::parse(
            r#"
            [agent]
            system_prompt = "Be terse. Tools: {tools}"
            recursion_limit = 10
            "#,
        )
        .unwrap();

        let demo = config.orchestrator(None, 25);
        assert_eq!(demo.system_prompt.as_deref(), Some("Be terse. Tools: {tools}"));
        assert_eq!(demo.run.recursion_limit, 10);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::locate(Some("/nonexistent/relay.toml".into())).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/relay.toml"));
    }
}
