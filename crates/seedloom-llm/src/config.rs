use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates JSON data.";

pub const ENV_BASE_URL: &str = "SEEDLOOM_LLM_BASE_URL";
pub const ENV_MODEL: &str = "SEEDLOOM_LLM_MODEL";
pub const ENV_API_KEY: &str = "SEEDLOOM_LLM_API_KEY";

/// Settings for an OpenAI-compatible chat-completions endpoint.
///
/// Deserializes from the `[llm]` table of a settings file; every key is optional.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Extra attempts after a retryable failure.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Replay earlier turns of the conversation on every call.
    pub keep_history: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: 120,
            max_retries: 2,
            retry_backoff_ms: 1_000,
            keep_history: false,
        }
    }
}

impl LlmConfig {
    /// Defaults overridden by `SEEDLOOM_LLM_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`; blank values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(base_url) = read(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(model) = read(ENV_MODEL) {
            self.model = model;
        }
        if let Some(api_key) = read(ENV_API_KEY) {
            self.api_key = Some(api_key);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Worst-case wall time of one `complete` call: every attempt timing out plus the
    /// backoff between attempts. Outer deadlines shorter than this cut retries off.
    pub fn call_budget(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        self.timeout() * attempts + self.retry_backoff() * self.max_retries
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("keep_history", &self.keep_history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_target_local_ollama() {
        let config = LlmConfig::default();
        assert_eq!(config.completions_url(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(config.model, "qwen2.5-coder:latest");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn env_overrides_skip_blank_values() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://llm.example.com/v1/"),
            (ENV_MODEL, "  "),
            (ENV_API_KEY, "sk-test"),
        ]
        .into_iter()
        .collect();

        let config = LlmConfig::default().with_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.completions_url(), "https://llm.example.com/v1/chat/completions");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn call_budget_covers_every_attempt() {
        let config = LlmConfig::default();
        assert_eq!(config.call_budget(), Duration::from_secs(120 * 3 + 2));

        let single = LlmConfig {
            timeout_secs: 10,
            max_retries: 0,
            ..LlmConfig::default()
        };
        assert_eq!(single.call_budget(), Duration::from_secs(10));
    }

    #[test]
    fn debug_hides_api_key() {
        let mut config = LlmConfig::default();
        config.api_key = Some("sk-secret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn partial_settings_table_keeps_defaults() {
        let config: LlmConfig = toml::from_str("model = \"llama3\"\nkeep_history = true\n").unwrap();
        assert_eq!(config.model, "llama3");
        assert!(config.keep_history);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
