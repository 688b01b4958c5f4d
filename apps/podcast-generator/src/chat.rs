//! Chat completion client for transcript generation

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::error::{GeneratorError, Result};

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn summary(&self) -> String {
        format!(
            "Tokens used: {} prompt + {} completion = {} total",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// First choice's text plus usage
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub usage: TokenUsage,
}

impl ChatCompletion {
    /// Parse a raw response body
    pub fn from_body(body: &str) -> Result<Self> {
        let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            GeneratorError::chat(format!("Failed to parse API response: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GeneratorError::chat("Response contained no message content"))?;

        Ok(Self {
            content,
            usage: response.usage.unwrap_or_default(),
        })
    }
}

/// Upstream message from an error body, or the body itself
pub fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => format!("{}: {}", status, parsed.error.message),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{}: {}", status, body.trim()),
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Chat completion backend.
///
/// One call per transcript; failures carry the raw upstream text and are
/// never retried.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletion>;
}

/// OpenAI-compatible `/chat/completions` client
#[derive(Debug)]
pub struct OpenaiChatClient {
    api_key: String,
    api_url: String,
    client: HttpClient,
}

impl OpenaiChatClient {
    pub fn new(config: &ChatConfig, api_key: &str) -> Self {
        Self::new_with_timeout(config, api_key, Duration::from_secs(config.timeout_secs))
    }

    pub fn new_with_timeout(config: &ChatConfig, api_key: &str, timeout: Duration) -> Self {
        let client = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            api_key: api_key.to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenaiChatClient {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletion> {
        ::log::info!(
            "Chat request: model={}, max_tokens={}, temperature={}",
            request.model,
            request.max_tokens,
            request.temperature
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::chat(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeneratorError::chat(e.to_string()))?;

        if !status.is_success() {
            ::log::error!("Chat API error ({}): {}", status, body);
            return Err(GeneratorError::chat(upstream_error_message(status, &body)));
        }

        let completion = ChatCompletion::from_body(&body)?;
        ::log::info!("Chat response: {} chars, {}", completion.content.len(), completion.usage.summary());
        Ok(completion)
    }
}
