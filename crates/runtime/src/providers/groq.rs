//! Groq backend, speaking the OpenAI-compatible chat completions API.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolSpec,
    Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ApiToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ApiMessage {
    fn text(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    /// JSON-encoded arguments object.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ApiFunction,
}

#[derive(Debug, Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a Groq backend.
#[derive(Debug, Clone)]
pub struct GroqBackendBuilder {
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    base_url: String,
}

impl GroqBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn build(self) -> GroqBackend {
        GroqBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            base_url: self.base_url,
        }
    }
}

/// Groq chat completions backend.
#[derive(Clone)]
pub struct GroqBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    base_url: String,
}

impl GroqBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> GroqBackendBuilder {
        GroqBackendBuilder::new(api_key, model)
    }

    /// Flatten one message into chat-completions messages. Each tool
    /// result becomes its own `tool` message.
    fn message_to_api(msg: &Message, out: &mut Vec<ApiMessage>) {
        match msg.role {
            Role::Assistant => {
                let text = msg.text();
                let tool_calls: Vec<ApiToolCall> = msg
                    .tool_calls()
                    .into_iter()
                    .map(|call| ApiToolCall {
                        id: call.id,
                        call_type: function_type(),
                        function: ApiFunctionCall {
                            name: call.name,
                            arguments: call.input.to_string(),
                        },
                    })
                    .collect();
                out.push(ApiMessage {
                    role: "assistant".to_string(),
                    content: (!text.is_empty() || tool_calls.is_empty()).then_some(text),
                    tool_calls,
                    tool_call_id: None,
                });
            }
            Role::User | Role::System => {
                let role = if msg.role == Role::System { "system" } else { "user" };
                let mut text = String::new();
                for part in &msg.parts {
                    match part {
                        Part::Text(t) => text.push_str(t),
                        Part::ToolResult(result) => out.push(ApiMessage {
                            role: "tool".to_string(),
                            content: Some(result.content_text()),
                            tool_calls: Vec::new(),
                            tool_call_id: Some(result.tool_call_id().to_string()),
                        }),
                        Part::ToolCall(_) => {}
                    }
                }
                if !text.is_empty() {
                    out.push(ApiMessage::text(role, text));
                }
            }
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            tool_type: "function",
            function: ApiFunction {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.schema.clone(),
            },
        }
    }

    fn response_to_message(message: ApiMessage) -> Message {
        let mut parts = Vec::new();
        if let Some(text) = message.content.filter(|t| !t.is_empty()) {
            parts.push(Part::Text(text));
        }
        for call in message.tool_calls {
            // Unparseable arguments are kept as a raw string; the tool host
            // rejects them and the model sees the failure.
            let input = serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments));
            parts.push(Part::ToolCall(ToolCall {
                id: call.id,
                name: call.function.name,
                input,
            }));
        }
        Message {
            role: Role::Assistant,
            parts,
        }
    }

    fn build_request(&self, request: &ModelRequest<'_>) -> ApiRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system {
            messages.push(ApiMessage::text("system", system.to_string()));
        }
        for msg in request.messages {
            Self::message_to_api(msg, &mut messages);
        }

        ApiRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages,
            tools: request.tools.iter().map(Self::tool_to_api).collect(),
        }
    }
}

impl std::fmt::Display for GroqBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "groq({})", self.model)
    }
}

impl Backend for GroqBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::NoChoices)?;
        let usage = api_response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ModelResponse {
            message: Self::response_to_message(choice.message),
            usage,
        })
    }
}
