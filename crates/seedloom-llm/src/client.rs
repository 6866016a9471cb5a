use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, SYSTEM_PROMPT};
use crate::error::{LlmError, Result};

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
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client that owns the optional conversation history.
pub struct ChatClient {
    http: Client,
    config: LlmConfig,
    history: Mutex<Vec<ChatMessage>>,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| LlmError::Client(err.to_string()))?;
        Ok(Self {
            http,
            config,
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send `prompt` as the next user turn and return the assistant's text.
    ///
    /// Calls are serialized while history is kept so turns stay paired.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut history = self.history.lock().await;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(Role::System, SYSTEM_PROMPT));
        if self.config.keep_history {
            messages.extend(history.iter().cloned());
        }
        let user = ChatMessage::new(Role::User, prompt);
        messages.push(user.clone());

        let content = self.send_with_retries(&messages).await?;

        if self.config.keep_history {
            history.push(user);
            history.push(ChatMessage::new(Role::Assistant, content.clone()));
        }
        Ok(content)
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    async fn send_with_retries(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.send(messages).await {
                Ok(content) => return Ok(content),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        model = %self.config.model,
                        attempt,
                        error = %err,
                        "completion failed, retrying"
                    );
                    let delay = err
                        .retry_after()
                        .unwrap_or_else(|| self.config.retry_backoff());
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };
        let mut request = self.http.post(self.config.completions_url()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!(model = %self.config.model, messages = messages.len(), "sending completion request");
        let response = request
            .send()
            .await
            .map_err(|err| LlmError::Network(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(|secs| secs * 1_000)
                .unwrap_or(self.config.retry_backoff_ms);
            return Err(LlmError::RateLimited { retry_after_ms });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        if let Some(usage) = parsed.usage {
            info!(
                model = %self.config.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response has no message content".to_string()))
    }
}
