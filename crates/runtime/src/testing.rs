//! In-memory doubles for the model and tool boundaries.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolSpec,
    Usage,
};
use crate::orchestrator::{Ask, Connect};
use crate::tools::{ToolError, ToolHost};
use crate::{Error, Result};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn text_reply(text: &str) -> Message {
    Message::assistant(text)
}

pub fn tool_reply(id: &str, name: &str, input: Value) -> Message {
    Message {
        role: Role::Assistant,
        parts: vec![Part::ToolCall(ToolCall {
            id: id.into(),
            name: name.into(),
            input,
        })],
    }
}

/// Replays canned assistant messages in order.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Message>>,
    repeat: Option<Message>,
    calls: Mutex<usize>,
    systems: Mutex<Vec<Option<String>>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = Message>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            repeat: None,
            calls: Mutex::new(0),
            systems: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with the same message.
    pub fn looping(reply: Message) -> Self {
        Self {
            repeat: Some(reply),
            ..Self::new([])
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn systems(&self) -> Vec<Option<String>> {
        self.systems.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    async fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> std::result::Result<ModelResponse, ModelError> {
        *self.calls.lock().unwrap() += 1;
        self.systems
            .lock()
            .unwrap()
            .push(request.system.map(str::to_string));

        let next = self.replies.lock().unwrap().pop_front();
        let message = next
            .or_else(|| self.repeat.clone())
            .ok_or_else(|| ModelError::Api("script exhausted".into()))?;
        Ok(ModelResponse {
            message,
            usage: Usage::default(),
        })
    }
}

/// Advertises the named tools and records what was executed.
pub struct FakeToolHost {
    specs: Vec<ToolSpec>,
    failures: HashMap<String, ToolError>,
    executed: Mutex<Vec<String>>,
}

impl FakeToolHost {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            specs: names
                .into_iter()
                .map(|name| ToolSpec {
                    name: name.to_string(),
                    description: format!("{name} tool"),
                    schema: json!({"type": "object"}),
                })
                .collect(),
            failures: HashMap::new(),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, name: &str, error: ToolError) -> Self {
        self.failures.insert(name.to_string(), error);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl ToolHost for FakeToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn execute(&self, call: &ToolCall) -> std::result::Result<Value, ToolError> {
        self.executed.lock().unwrap().push(call.name.clone());
        match self.failures.get(&call.name) {
            Some(error) => Err(error.clone()),
            None => Ok(Value::String(format!("{} ok", call.name))),
        }
    }
}

/// An [`Ask`] that echoes the newest message and how much context it saw.
///
/// The text `fail` makes it return a model error.
pub struct EchoAgent;

impl Ask for EchoAgent {
    async fn ask(&self, conversation: Vec<Message>) -> Result<String> {
        let last = conversation.last().map(Message::text).unwrap_or_default();
        if last == "fail" {
            return Err(Error::Model(ModelError::Api("503 Service Unavailable".into())));
        }
        Ok(format!("echo: {last} ({} messages)", conversation.len()))
    }

    fn tool_names(&self) -> Vec<String> {
        vec!["add".into(), "multiply".into(), "get_weather".into()]
    }
}

/// Counts how many [`EchoAgent`]s it has built.
#[derive(Default)]
pub struct CountingConnector {
    connects: AtomicUsize,
    fail: bool,
}

impl CountingConnector {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connect for CountingConnector {
    type Agent = EchoAgent;

    async fn connect(&self) -> Result<EchoAgent> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Config("GROQ_API_KEY not set".into()));
        }
        Ok(EchoAgent)
    }
}
