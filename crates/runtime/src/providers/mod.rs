//! LLM provider adapters.
//!
//! [`GroqBackend`] implements [`Backend`](crate::Backend) for Groq's
//! OpenAI-compatible chat completions API. [`ProviderConfig`] builds one from
//! configuration and the environment.

mod groq;

pub use groq::{GroqBackend, GroqBackendBuilder};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Environment variable holding the Groq credential.
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Model configuration. Credentials never live here; they come from the
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Model name; [`DEFAULT_GROQ_MODEL`] when unset.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Override the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: None,
            base_url: None,
        }
    }
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_GROQ_MODEL)
    }

    /// Build a backend, reading the credential from the environment.
    ///
    /// Fails with [`Error::Config`] when `GROQ_API_KEY` is unset or blank.
    pub fn backend_from_env(&self) -> Result<GroqBackend> {
        let api_key = std::env::var(GROQ_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{GROQ_API_KEY_VAR} not set")))?;
        Ok(self.backend(api_key))
    }

    pub fn backend(&self, api_key: impl Into<String>) -> GroqBackend {
        let mut builder =
            GroqBackend::builder(api_key, self.model()).temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }
}
