//! Async client for OpenAI-compatible chat completions endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Messages ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

/// One turn in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:    Role,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: Role::Assistant, content: content.into() }
  }
}

// ─── Generator trait ─────────────────────────────────────────────────────────

/// Backend-agnostic text generation.
///
/// Handlers depend on this trait rather than on [`OpenAiClient`] directly so
/// tests can substitute canned or failing generators.
pub trait TextGenerator: Send + Sync {
  /// Multi-turn chat completion over the full message history.
  fn chat(
    &self,
    messages: &[ChatMessage],
  ) -> impl Future<Output = Result<String>> + Send;

  /// Single-shot generation with an optional system prompt.
  fn generate(
    &self,
    system: Option<&str>,
    prompt: &str,
  ) -> impl Future<Output = Result<String>> + Send {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
      messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));
    async move { self.chat(&messages).await }
  }
}

// ─── OpenAI client ───────────────────────────────────────────────────────────

/// Connection settings for the generation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenAiConfig {
  /// Endpoint root, e.g. `https://api.openai.com`. The chat completions path
  /// is appended by the client.
  pub base_url:     String,
  pub api_key:      String,
  pub model:        String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 30 }

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenAiClient {
  client: reqwest::Client,
  config: GenAiConfig,
}

impl OpenAiClient {
  pub fn new(config: GenAiConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1/chat/completions",
      self.config.base_url.trim_end_matches('/')
    )
  }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
  model:       &'a str,
  messages:    &'a [ChatMessage],
  temperature: f32,
  max_tokens:  u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

impl TextGenerator for OpenAiClient {
  fn chat(
    &self,
    messages: &[ChatMessage],
  ) -> impl Future<Output = Result<String>> + Send {
    let body = CompletionRequest {
      model: &self.config.model,
      messages,
      temperature: 0.7,
      max_tokens: 2000,
    };

    let request = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&body);

    async move {
      let resp = request.send().await?;
      let status = resp.status();
      if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(%status, "chat completion request rejected");
        return Err(Error::Api { status: status.as_u16(), body });
      }

      let parsed: CompletionResponse = resp.json().await?;
      parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(Error::MissingContent)
    }
  }
}
