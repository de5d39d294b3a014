use std::env;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level failures from the language-model collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("model rate limit exceeded")]
    RateLimited,
    #[error("model returned an empty reply")]
    EmptyReply,
    #[error("model request failed with status {0}")]
    HttpStatus(StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The surface the generator needs from the model: submit a prompt, receive
/// text, or fail — with rate limiting as a distinguishable failure.
#[async_trait]
pub trait QuestionModel: Send + Sync {
    /// Submit a system/user prompt pair and return the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::RateLimited` when the collaborator signals a
    /// rate-limit condition; other transport failures propagate as-is.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError>;
}

#[derive(Clone, Debug)]
pub struct ChatModelConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatModelConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("EXAM_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("EXAM_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("EXAM_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// OpenAI-style chat-completions client.
#[derive(Clone)]
pub struct ChatCompletionsModel {
    client: Client,
    config: ChatModelConfig,
}

impl ChatCompletionsModel {
    #[must_use]
    pub fn new(config: ChatModelConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build a client from the environment, or `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        ChatModelConfig::from_env().map(Self::new)
    }
}

#[async_trait]
impl QuestionModel for ChatCompletionsModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(ModelError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ModelError::EmptyReply)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
