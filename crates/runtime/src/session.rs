//! Chat session state.
//!
//! A [`ChatSession`] owns the visible transcript and the cached agent. The
//! chat loop creates one, feeds it lines and drops it on exit.

use chrono::{DateTime, Local};

use crate::cache::AgentCache;
use crate::model::{Message, Role};
use crate::orchestrator::{Ask, Connect};

/// One rendered line of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
    /// The entry renders a failure rather than a model answer.
    pub is_error: bool,
}

impl TranscriptEntry {
    fn new(role: Role, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
            is_error,
        }
    }
}

/// A single-user conversation backed by a lazily built agent.
pub struct ChatSession<C: Connect> {
    cache: AgentCache<C>,
    transcript: Vec<TranscriptEntry>,
}

impl<C: Connect> ChatSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            cache: AgentCache::new(connector),
            transcript: Vec::new(),
        }
    }

    /// Send a user message and return the entry holding the answer.
    ///
    /// Connects on first use. Failures are rendered into the transcript as
    /// `Error: {message}` entries instead of being returned.
    pub async fn send(&mut self, input: &str) -> &TranscriptEntry {
        self.transcript
            .push(TranscriptEntry::new(Role::User, input, false));

        let reply = match self.cache.get_or_connect().await {
            Ok(agent) => agent.ask(self.context()).await,
            Err(e) => Err(e),
        };

        let entry = match reply {
            Ok(text) => TranscriptEntry::new(Role::Assistant, text, false),
            Err(e) => {
                tracing::error!(error = %e, "chat turn failed");
                TranscriptEntry::new(Role::Assistant, format!("Error: {e}"), true)
            }
        };
        self.transcript.push(entry);
        &self.transcript[self.transcript.len() - 1]
    }

    /// Messages forwarded to the agent: the transcript without error entries.
    pub fn context(&self) -> Vec<Message> {
        self.transcript
            .iter()
            .filter(|entry| !entry.is_error)
            .map(|entry| Message::text_message(entry.role, entry.content.clone()))
            .collect()
    }

    /// Clear the transcript and drop the cached agent.
    pub async fn reset(&mut self) {
        self.transcript.clear();
        self.cache.invalidate().await;
        tracing::info!("session reset");
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Whether an agent is connected and cached.
    pub async fn is_ready(&self) -> bool {
        self.cache.cached().await.is_some()
    }

    /// Tools of the cached agent, if one is connected.
    pub async fn tool_names(&self) -> Option<Vec<String>> {
        self.cache.cached().await.map(|agent| agent.tool_names())
    }

    #[cfg(test)]
    pub fn cache(&self) -> &AgentCache<C> {
        &self.cache
    }
}
