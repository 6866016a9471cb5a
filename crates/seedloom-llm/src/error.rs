use std::time::Duration;

use thiserror::Error;

use seedloom_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited (retry after {retry_after_ms} ms)")]
    RateLimited { retry_after_ms: u64 },
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("missing bracket delimiters")]
    MissingDelimiters,
    #[error("response is not a JSON array: {0}")]
    NotAnArray(String),
    #[error("element {index} is not a JSON object")]
    NonObjectElement { index: usize },
}

impl LlmError {
    /// Transport failures, server errors and throttling are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Delay the server asked for before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after_ms } => {
                Some(Duration::from_millis(*retry_after_ms))
            }
            _ => None,
        }
    }
}

impl From<LlmError> for CoreError {
    fn from(err: LlmError) -> Self {
        CoreError::Generation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
