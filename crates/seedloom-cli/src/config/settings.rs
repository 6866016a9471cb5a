use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use seedloom_llm::LlmConfig;
use seedloom_store::StoreOptions;

use super::{ConfigError, ConfigResult};

/// Contents of `seedloom.toml`; every table and key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub store: StoreOptions,
    pub run: RunSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub sample_size: Option<u32>,
    /// Deadline for each generator or store call; unset means the model client's full
    /// retry budget.
    pub call_timeout_secs: Option<u64>,
}

impl Settings {
    /// Per-call deadline handed to the engine.
    pub fn call_timeout(&self) -> Duration {
        match self.run.call_timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => self.llm.call_budget(),
        }
    }
}

/// Load settings from `path`; a missing file yields defaults unless `required`.
pub fn load_settings(path: &Path, required: bool) -> ConfigResult<Settings> {
    if !path.exists() {
        if required {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_merge_over_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "llama3.1"
            temperature = 0.2

            [store]
            url = "https://pb.example.com"
            auth_path = "/api/collections/_superusers/auth-with-password"

            [run]
            sample_size = 25
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.model, "llama3.1");
        assert_eq!(settings.llm.base_url, seedloom_llm::DEFAULT_BASE_URL);
        assert_eq!(settings.store.url, "https://pb.example.com");
        assert_eq!(settings.store.page_size, 200);
        assert_eq!(settings.run.sample_size, Some(25));
        assert_eq!(settings.run.call_timeout_secs, None);
    }

    #[test]
    fn call_timeout_defaults_to_model_retry_budget() {
        let settings: Settings =
            toml::from_str("[llm]\ntimeout_secs = 20\nmax_retries = 1\nretry_backoff_ms = 500\n")
                .unwrap();
        assert_eq!(settings.call_timeout(), Duration::from_millis(40_500));

        let pinned: Settings = toml::from_str("[run]\ncall_timeout_secs = 15\n").unwrap();
        assert_eq!(pinned.call_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn missing_file_is_optional_unless_required() {
        let path = std::env::temp_dir().join(format!("seedloom-{}.toml", uuid::Uuid::new_v4()));

        let settings = load_settings(&path, false).unwrap();
        assert_eq!(settings.store.url, seedloom_store::DEFAULT_URL);

        let err = load_settings(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn unknown_values_are_reported() {
        let path = std::env::temp_dir().join(format!("seedloom-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[run]\nsample_size = \"many\"\n").unwrap();

        let err = load_settings(&path, false).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));

        std::fs::remove_file(path).unwrap();
    }
}
