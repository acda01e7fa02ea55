//! Async LLM client for chat turns and document extraction
//!
//! Model-agnostic HTTP client. Speaks the Anthropic messages API and
//! OpenAI-compatible chat completions; the format is picked from the URL.
//! Callers go through [`ModelBackend`] so sessions can run against a
//! scripted model in tests.

use std::future::Future;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::core::config::{config, SessionConfig};
use crate::core::error::LlmError;

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry of the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Completion text plus token accounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Anything that can answer a system prompt + history with a completion
pub trait ModelBackend {
    fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<Completion, LlmError>> + Send;
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            max_tokens: config().max_tokens,
            api_format,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY (or ANTHROPIC_API_KEY)
    /// Optional: LLM_API_URL, LLM_MODEL (default to the session config)
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(config())
    }

    pub fn from_config(cfg: &SessionConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
            .map_err(|_| LlmError::Configuration("no API key configured".into()))?;
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".into()));
        }
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| cfg.api_url.clone());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| cfg.model.clone());

        Ok(Self::new(api_key, api_url, model).with_max_tokens(cfg.max_tokens))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    async fn complete_anthropic(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: wire_messages(messages),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let body = read_body(response).await?;
        parse_anthropic(&body)
    }

    async fn complete_openai(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        let mut wire = vec![WireMessage {
            role: "system",
            content: system,
        }];
        wire.extend(wire_messages(messages));

        let request = OpenAIRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: wire,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let body = read_body(response).await?;
        parse_openai(&body)
    }
}

impl ModelBackend for LlmClient {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        tracing::debug!(
            "model call: {} message(s), {} system chars",
            messages.len(),
            system.len()
        );
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, messages).await,
            ApiFormat::OpenAI => self.complete_openai(system, messages).await,
        }
    }
}

/// Map non-success statuses to typed errors; 401/403 are configuration
/// problems, everything else is the provider's
async fn read_body(response: Response) -> Result<String, LlmError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::Transport(e.to_string()))?;
    if status.is_success() {
        return Ok(body);
    }
    Err(status_error(status.as_u16(), body))
}

fn status_error(status: u16, message: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Configuration(format!("authentication failed ({}): {}", status, message)),
        _ => LlmError::Provider { status, message },
    }
}

fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

fn parse_anthropic(body: &str) -> Result<Completion, LlmError> {
    let response: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
    let text: String = response
        .content
        .iter()
        .filter_map(|block| block.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    let usage = response.usage.unwrap_or_default();
    Ok(Completion {
        text,
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
    })
}

fn parse_openai(body: &str) -> Result<Completion, LlmError> {
    let response: OpenAIResponse =
        serde_json::from_str(body).map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)?;
    let usage = response.usage.unwrap_or_default();
    Ok(Completion {
        text,
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    })
}

// Shared
#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
