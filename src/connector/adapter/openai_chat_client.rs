use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{ChatClient, CompletionRequest};
use crate::domain::{ChatMessage, DomainError, Role, ToolCall, ToolDefinition};

/// Default target: a local vLLM server started with the serving recipe.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8082/v1";
pub const DEFAULT_MODEL: &str = "qwen3-14b-ft-with-thinking";
const COMPLETIONS_PATH: &str = "/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECTION_TEST_MAX_TOKENS: u32 = 5;
/// Sent alongside tools; reasoning models think harder before picking one.
const TOOL_REASONING_EFFORT: &str = "high";

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'a str>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_content: Option<&'a str>,
    #[serde(skip_serializing_if = "<[ToolCall]>::is_empty")]
    tool_calls: &'a [ToolCall],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

impl<'a> ApiMessage<'a> {
    fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
            reasoning_content: None,
            tool_calls: &[],
            tool_call_id: None,
        }
    }

    fn from_message(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
            reasoning_content: match message.role {
                Role::Assistant => message.reasoning.as_deref(),
                _ => None,
            },
            tool_calls: &message.tool_calls,
            tool_call_id: message.tool_call_id.as_deref(),
        }
    }
}

/// Minimal subset of the chat-completions response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

impl From<ApiResponseMessage> for ChatMessage {
    fn from(message: ApiResponseMessage) -> Self {
        let reasoning = message
            .reasoning_content
            .filter(|r| !r.is_empty())
            .or(message.reasoning)
            .unwrap_or_default();
        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter(|c| !c.function.name.is_empty())
            .collect();

        ChatMessage::assistant(message.content.unwrap_or_default())
            .with_reasoning(reasoning)
            .with_tool_calls(tool_calls)
    }
}

/// HTTP client for OpenAI-compatible chat-completions endpoints (vLLM,
/// SGLang, LM Studio, the OpenAI API itself).
///
/// Requests are non-streaming; one call yields one complete assistant
/// message, tool calls included. Configuration comes from flags or, failing
/// that, from the environment:
///
/// | Variable            | Default                        |
/// |---------------------|--------------------------------|
/// | `TOOLCHAT_BASE_URL` | `http://localhost:8082/v1`     |
/// | `TOOLCHAT_MODEL`    | `qwen3-14b-ft-with-thinking`   |
/// | `TOOLCHAT_API_KEY`  | `""` (no Authorization header) |
pub struct OpenAiChatClient {
    client: reqwest::Client,
    connection_test_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        let base_url = base.trim_end_matches('/').to_string();
        let url = format!("{base_url}{COMPLETIONS_PATH}");
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            connection_test_client: reqwest::Client::builder()
                .timeout(CONNECTION_TEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            base_url,
            url,
        }
    }

    /// Explicit values win; missing ones fall back to the environment, then
    /// to the defaults.
    pub fn from_env_or(base_url: Option<String>, model: Option<String>, api_key: Option<String>) -> Self {
        let base = base_url
            .or_else(|| std::env::var("TOOLCHAT_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .or_else(|| std::env::var("TOOLCHAT_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let key = api_key
            .or_else(|| std::env::var("TOOLCHAT_API_KEY").ok())
            .unwrap_or_default();
        Self::new(key, model, base)
    }

    pub fn from_env() -> Self {
        Self::from_env_or(None, None, None)
    }

    fn post(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = client.post(&self.url);
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> DomainError {
        if e.is_connect() {
            DomainError::endpoint(format!(
                "Cannot connect to {}. Make sure the inference server is running. ({e})",
                self.base_url
            ))
        } else if e.is_timeout() {
            DomainError::endpoint(format!(
                "Request to {} timed out; the server may be overloaded or not responding. ({e})",
                self.base_url
            ))
        } else {
            DomainError::endpoint(format!("Request to {} failed: {e}", self.base_url))
        }
    }

    async fn status_error(&self, response: reqwest::Response) -> DomainError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("Chat endpoint returned {status}: {body}");

        if status == StatusCode::NOT_FOUND || body.contains("does not exist") {
            DomainError::endpoint(format!(
                "Model '{}' not found or unavailable at {} ({status}): {body}",
                self.model, self.base_url
            ))
        } else {
            DomainError::endpoint(format!("Endpoint returned {status}: {body}"))
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<ChatMessage, DomainError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ApiMessage::system(&request.system));
        messages.extend(request.messages.iter().map(ApiMessage::from_message));

        let has_tools = !request.tools.is_empty();
        let body = ApiRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
            tools: has_tools.then_some(request.tools.as_slice()),
            reasoning_effort: has_tools.then_some(TOOL_REASONING_EFFORT),
        };

        debug!(
            "POST {} model={} messages={} tools={}",
            self.url,
            self.model,
            body.messages.len(),
            request.tools.len()
        );

        let response = self
            .post(&self.client)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.status_error(response).await);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| DomainError::endpoint(format!("Failed to parse chat response: {e}")))?;

        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| DomainError::endpoint("Chat response contained no choices"))?;

        Ok(message.into())
    }

    async fn test_connection(&self) -> Result<String, DomainError> {
        let body = ApiRequest {
            model: &self.model,
            messages: vec![ApiMessage {
                role: "user",
                content: "test",
                reasoning_content: None,
                tool_calls: &[],
                tool_call_id: None,
            }],
            temperature: 0.0,
            max_tokens: CONNECTION_TEST_MAX_TOKENS,
            stream: false,
            tools: None,
            reasoning_effort: None,
        };

        let response = self
            .post(&self.connection_test_client)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.status_error(response).await);
        }

        Ok(format!(
            "Connection successful! Model '{}' is responding at {}.",
            self.model, self.base_url
        ))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
