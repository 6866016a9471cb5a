//! OpenAI-compatible text-model adapter for seedloom.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;

pub use client::{ChatClient, ChatMessage, Role, Usage};
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ENV_API_KEY, ENV_BASE_URL, ENV_MODEL,
    LlmConfig, SYSTEM_PROMPT,
};
pub use error::{LlmError, Result};
pub use extract::extract_json_array;
pub use generator::{LlmGenerator, format_instruction};
