use thiserror::Error;

use seedloom_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx reply; `message` is PocketBase's own message when it sent one.
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("record rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn into_authentication(self) -> CoreError {
        CoreError::Authentication(self.to_string())
    }

    pub fn into_persistence(self) -> CoreError {
        CoreError::Persistence(self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
