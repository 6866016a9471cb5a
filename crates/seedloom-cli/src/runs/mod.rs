mod atomic;
mod logging;
mod run;

pub use logging::init_run_logging;
pub use run::{RunContext, RunOptions, RunPaths, start_run, write_cache, write_report};

use thiserror::Error;

/// Errors raised while writing run artifacts.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid artifact path: {0}")]
    InvalidPath(String),
    #[error("logging error: {0}")]
    Logging(String),
}

pub type RunResult<T> = std::result::Result<T, RunError>;
