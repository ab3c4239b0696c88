//! Chat completion client
//!
//! Speaks the OpenAI chat-completions schema against the configured
//! endpoint, forwarding the model id, deterministic seed, and temperature
//! with every request.

use crate::config::ChatConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One conversation turn sent with the completion request
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// AI chat completion service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send the conversation so far, newest turn last, and return the
    /// assistant's reply text.
    async fn complete(&self, history: &[ChatTurn]) -> Result<String, CoreError>;
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    seed: u64,
    temperature: f64,
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
    content: String,
}

/// Client for an OpenAI-compatible completion endpoint
pub struct PollinationsChat {
    client: reqwest::Client,
    config: ChatConfig,
}

impl PollinationsChat {
    pub fn new(config: ChatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }
}

#[async_trait]
impl ChatService for PollinationsChat {
    async fn complete(&self, history: &[ChatTurn]) -> Result<String, CoreError> {
        let body = CompletionRequest {
            model: &self.config.model,
            messages: history
                .iter()
                .map(|turn| WireMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
            seed: self.config.seed,
            temperature: self.config.temperature,
        };

        tracing::debug!(model = %self.config.model, turns = history.len(), "Sending chat request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::ChatService {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CoreError::ChatService {
                message: format!("chat endpoint returned {}", response.status()),
            });
        }

        let parsed: CompletionResponse =
            response.json().await.map_err(|e| CoreError::ChatService {
                message: e.to_string(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CoreError::ChatService {
                message: "empty completion response".to_string(),
            })
    }
}
