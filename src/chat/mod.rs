//! Chat against a hosted completion API
//!
//! Each call is stateless: one user message plus a fixed system prompt,
//! forwarded to an OpenAI-compatible `/chat/completions` endpoint. No
//! streaming, no conversation history, no retries. The transcript kept by
//! the interactive command lives only in process memory.

use crate::config::{ChatConfig, Config};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Reply used when the provider returns no usable completion
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the local transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            role,
            created_at: Utc::now(),
        }
    }
}

/// In-memory transcript for one interactive session. Cleared on user
/// request; gone when the command exits.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::new(Role::User, content));
        self.messages.last().expect("just pushed")
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
        self.messages.last().expect("just pushed")
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the hosted completion API
#[derive(Debug)]
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: ChatConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            config,
            api_key,
        }
    }

    /// Build a client from loaded configuration, resolving the credential
    /// from the configured environment variable
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.chat_api_key().ok_or_else(|| {
            Error::Config(format!(
                "API key not configured (set {})",
                config.chat.api_key_env
            ))
        })?;
        Ok(Self::new(config.chat.clone(), api_key))
    }

    /// Send one message and return the reply text.
    ///
    /// An empty or whitespace-only message fails validation before any
    /// network traffic. Provider errors come back as upstream errors
    /// carrying the provider's message text.
    pub async fn send(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::Validation("Message is required".to_string()));
        }

        let request = CompletionRequest {
            model: &self.config.model,
            messages: vec![
                RequestMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                RequestMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!("Sending chat message to {}", self.config.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Upstream(format!(
                "Chat API error ({}): {}",
                status, body
            )));
        }

        let parsed: CompletionResponse = response.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        Ok(reply)
    }
}
