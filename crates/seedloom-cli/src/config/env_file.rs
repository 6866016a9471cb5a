use std::collections::BTreeMap;
use std::path::Path;

use seedloom_core::Credentials;

use super::{ConfigError, ConfigResult};

pub const ENV_STORE_EMAIL: &str = "SEEDLOOM_STORE_EMAIL";
pub const ENV_STORE_PASSWORD: &str = "SEEDLOOM_STORE_PASSWORD";

/// Process environment backed by values from a `.env` style file.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    file: BTreeMap<String, String>,
}

impl EnvSource {
    /// Read `path` if it exists; a missing file is an error only when `required`.
    pub fn load(path: &Path, required: bool) -> ConfigResult<Self> {
        if !path.exists() {
            if required {
                return Err(ConfigError::Missing(path.display().to_string()));
            }
            return Ok(Self::default());
        }
        Ok(Self {
            file: load_env_file(path)?,
        })
    }

    /// Process variables win over file values.
    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.file.get(key).cloned())
            .filter(|value| !value.is_empty())
    }

    pub fn require(&self, key: &str) -> ConfigResult<String> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    pub fn store_credentials(&self) -> ConfigResult<Credentials> {
        Ok(Credentials::new(
            self.require(ENV_STORE_EMAIL)?,
            self.require(ENV_STORE_PASSWORD)?,
        ))
    }
}

pub fn load_env_file(path: &Path) -> ConfigResult<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let mut values = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        values.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    Ok(values)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
