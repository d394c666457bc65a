/// LLM client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: no other module talks to the provider directly. Callers
/// depend on the `LanguageModel` trait so handlers and tests can swap in a
/// double without touching HTTP.
///
/// Calls are made once. Failures are reported to the caller, which decides
/// whether to degrade (question fallback) or surface the error.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// Model for text-only prompts (question generation).
pub const CHAT_MODEL: &str = "gpt-4o-mini";
/// Model for prompts that carry a document attachment.
pub const DOCUMENT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One part of a multimodal user message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    File { file: FileAttachment },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileAttachment {
    pub filename: String,
    /// `data:<mime>;base64,<payload>`
    pub file_data: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Inlines a PDF as a base64 data URL.
    pub fn pdf(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let encoded = general_purpose::STANDARD.encode(bytes);
        ContentPart::File {
            file: FileAttachment {
                filename: filename.into(),
                file_data: format!("data:application/pdf;base64,{encoded}"),
            },
        }
    }
}

/// A single system + user exchange.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: &'static str,
    pub system: String,
    pub user: Vec<ContentPart>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: &'static str, system: impl Into<String>) -> Self {
        Self {
            model,
            system: system.into(),
            user: Vec::new(),
            max_tokens: None,
        }
    }

    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.user.push(part);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Anything that can answer a `ChatRequest` with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

// ── wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: WireContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Parts(&'a [ContentPart]),
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl<'a> CompletionRequest<'a> {
    fn from_chat(request: &'a ChatRequest) -> Self {
        Self {
            model: request.model,
            max_tokens: request.max_tokens,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: WireContent::Text(&request.system),
                },
                WireMessage {
                    role: "user",
                    content: WireContent::Parts(&request.user),
                },
            ],
        }
    }
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let body = CompletionRequest::from_chat(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_error_message(body),
            });
        }

        let completion: CompletionResponse = response.json().await?;
        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        first_choice_text(completion)
    }
}

fn first_choice_text(completion: CompletionResponse) -> Result<String, LlmError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyContent)
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn provider_error_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
