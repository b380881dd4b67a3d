//! Reason/act loop.
//!
//! The agent alternates between asking the model for the next message and
//! executing the tool calls that message requests, until the model answers
//! without tools:
//!
//! ```text
//! Idle → Reasoning → { ToolCall → AwaitingToolResult → Reasoning }* → Done
//! ```
//!
//! Every model call and every tool round counts as one step. A turn that
//! needs more than [`RunConfig::recursion_limit`] steps fails with
//! [`Error::RecursionLimit`].

use crate::model::{Backend, Message, ModelRequest, ToolCall, ToolResult};
use crate::tools::{ToolError, ToolHost};
use crate::{Error, Result};
use tracing::Instrument;

/// Step bound used when the caller does not choose one.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Conversation identifier attached to every invocation.
pub const DEFAULT_THREAD_ID: &str = "1";

/// Per-invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub recursion_limit: usize,
    pub thread_id: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            thread_id: DEFAULT_THREAD_ID.to_string(),
        }
    }
}

impl RunConfig {
    pub fn with_recursion_limit(mut self, recursion_limit: usize) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }
}

/// A model bound to a tool catalog and a system prompt.
pub struct Agent<B, H> {
    backend: B,
    tools: H,
    system: Option<String>,
}

impl<B: Backend, H: ToolHost> Agent<B, H> {
    /// Build an agent. Taking the host by value means its catalog has
    /// already been fetched.
    pub fn new(backend: B, tools: H) -> Self {
        Self {
            backend,
            tools,
            system: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn tools(&self) -> &H {
        &self.tools
    }

    pub fn into_tools(self) -> H {
        self.tools
    }

    /// Run one turn to completion and return the updated conversation.
    ///
    /// The last message of the result is the model's final answer.
    pub async fn invoke(&self, messages: Vec<Message>, run: &RunConfig) -> Result<Vec<Message>> {
        let span = tracing::info_span!(
            "agent.invoke",
            thread_id = %run.thread_id,
            recursion_limit = run.recursion_limit
        );
        self.run_loop(messages, run.recursion_limit)
            .instrument(span)
            .await
    }

    async fn run_loop(&self, mut messages: Vec<Message>, limit: usize) -> Result<Vec<Message>> {
        let mut steps = 0;
        loop {
            take_step(&mut steps, limit)?;
            let response = self
                .backend
                .call(ModelRequest {
                    system: self.system.as_deref(),
                    messages: &messages,
                    tools: self.tools.specs(),
                })
                .await?;
            tracing::debug!(
                step = steps,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "model responded"
            );

            let calls = response.message.tool_calls();
            messages.push(response.message);
            if calls.is_empty() {
                return Ok(messages);
            }

            take_step(&mut steps, limit)?;
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(self.execute(call).await);
            }
            messages.push(Message::tool_results(results));
        }
    }

    async fn execute(&self, call: ToolCall) -> ToolResult {
        let outcome = if self.tools.has_tool(&call.name) {
            self.tools.execute(&call).await
        } else {
            Err(ToolError::NotFound(call.name.clone()))
        };

        match outcome {
            Ok(output) => {
                tracing::info!(tool = %call.name, "tool call succeeded");
                ToolResult::Success {
                    tool_call_id: call.id,
                    output,
                }
            }
            Err(error) => {
                tracing::warn!(tool = %call.name, %error, "tool call failed");
                ToolResult::Failure {
                    tool_call_id: call.id,
                    error,
                }
            }
        }
    }
}

fn take_step(steps: &mut usize, limit: usize) -> Result<()> {
    *steps += 1;
    if *steps > limit {
        return Err(Error::RecursionLimit(limit));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Part, Role};
    use crate::testing::{FakeToolHost, ScriptedBackend, text_reply, tool_reply};
    use crate::tools::EmptyToolHost;
    use serde_json::json;

    #[tokio::test]
    async fn answers_directly_without_tools() {
        let backend = ScriptedBackend::new([text_reply("Hello!")]);
        let agent = Agent::new(backend, EmptyToolHost);

        let messages = agent
            .invoke(vec![Message::user("hi")], &RunConfig::default())
            .await
            .unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages.last().unwrap().text(), "Hello!");
    }

    #[tokio::test]
    async fn chains_tool_calls_until_final_answer() {
        let backend = ScriptedBackend::new([
            tool_reply("call_1", "add", json!({"a": 3, "b": 5})),
            tool_reply("call_2", "multiply", json!({"a": 8, "b": 12})),
            text_reply("(3 + 5) x 12 = 96"),
        ]);
        let host = FakeToolHost::new(["add", "multiply"]);
        let agent = Agent::new(backend, host).with_system("Use tools.");

        let messages = agent
            .invoke(vec![Message::user("what's (3 + 5) x 12?")], &RunConfig::default())
            .await
            .unwrap();

        // user, call, result, call, result, answer
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[5].text(), "(3 + 5) x 12 = 96");
        assert_eq!(agent.tools().executed(), vec!["add", "multiply"]);

        let Part::ToolResult(result) = &messages[2].parts[0] else {
            panic!("expected a tool result");
        };
        assert_eq!(result.tool_call_id(), "call_1");
        assert_eq!(messages[2].role, Role::User);
    }

    #[tokio::test]
    async fn system_prompt_reaches_backend() {
        let backend = ScriptedBackend::new([text_reply("ok")]);
        let agent = Agent::new(backend, EmptyToolHost).with_system("Be brief.");
        agent
            .invoke(vec![Message::user("hi")], &RunConfig::default())
            .await
            .unwrap();
        assert_eq!(agent.backend.systems(), vec![Some("Be brief.".to_string())]);
    }

    #[tokio::test]
    async fn unknown_tool_is_never_executed() {
        let backend = ScriptedBackend::new([
            tool_reply("call_1", "divide", json!({"a": 1, "b": 0})),
            text_reply("I can't divide."),
        ]);
        let agent = Agent::new(backend, FakeToolHost::new(["add"]));

        let messages = agent
            .invoke(vec![Message::user("1 / 0?")], &RunConfig::default())
            .await
            .unwrap();

        assert!(agent.tools().executed().is_empty());
        let Part::ToolResult(result) = &messages[2].parts[0] else {
            panic!("expected a tool result");
        };
        assert!(result.is_failure());
        assert_eq!(result.content_text(), "Error: tool not found: divide");
    }

    #[tokio::test]
    async fn tool_failure_is_returned_to_model() {
        let backend = ScriptedBackend::new([
            tool_reply("call_1", "add", json!({"a": 1, "b": 2})),
            text_reply("The math server failed."),
        ]);
        let host = FakeToolHost::new(["add"]).failing("add", ToolError::Execution("boom".into()));
        let agent = Agent::new(backend, host);

        let messages = agent
            .invoke(vec![Message::user("1 + 2?")], &RunConfig::default())
            .await
            .unwrap();
        assert_eq!(messages.last().unwrap().text(), "The math server failed.");
    }

    #[tokio::test]
    async fn recursion_limit_stops_runaway_loop() {
        let backend = ScriptedBackend::looping(tool_reply("call", "add", json!({"a": 1, "b": 1})));
        let agent = Agent::new(backend, FakeToolHost::new(["add"]));

        let err = agent
            .invoke(
                vec![Message::user("keep adding")],
                &RunConfig::default().with_recursion_limit(4),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RecursionLimit(4)));
        // model, tools, model, tools; the fifth step is refused
        assert_eq!(agent.backend.calls(), 2);
        assert_eq!(agent.tools().executed().len(), 2);
    }

    #[test]
    fn default_run_config() {
        let run = RunConfig::default();
        assert_eq!(run.recursion_limit, 25);
        assert_eq!(run.thread_id, "1");
    }
}
