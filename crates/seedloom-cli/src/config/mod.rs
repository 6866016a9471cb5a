mod env_file;
mod settings;

pub use env_file::EnvSource;
pub use settings::{Settings, load_settings};

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("toml decode error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("file not found: {0}")]
    Missing(String),
    #[error("environment variable {0} is not set")]
    MissingVariable(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
