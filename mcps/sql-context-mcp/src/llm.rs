//! Chat model abstraction and the OpenAI-compatible client

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

/// Trait for chat completion backends
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system prompt and one user message, get the reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Get the model name
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [MessagePayload<'a>; 2],
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for `/chat/completions` on an OpenAI-compatible API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Build a client when an API key is available
    pub fn from_config(config: &ModelConfig, api_key: Option<String>) -> Option<Self> {
        api_key.map(|key| Self::new(&config.base_url, &key, &config.name))
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                MessagePayload {
                    role: "system",
                    content: system,
                },
                MessagePayload {
                    role: "user",
                    content: user,
                },
            ],
        };

        tracing::debug!(model = %self.model, "Requesting chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Chat completion API error {}: {}", status, text);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("Chat completion returned no choices")?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
