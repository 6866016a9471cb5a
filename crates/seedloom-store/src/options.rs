use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_AUTH_PATH: &str = "/api/admins/auth-with-password";

/// Options that control how the PocketBase adapter talks to the server.
///
/// Deserializes from the `[store]` table of a settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub url: String,
    /// PocketBase 0.23+ authenticates admins at `/api/collections/_superusers/auth-with-password`.
    pub auth_path: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            page_size: 200,
            timeout_secs: 30,
        }
    }
}

impl StoreOptions {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn auth_url(&self) -> String {
        self.endpoint(&self.auth_path)
    }

    pub(crate) fn records_url(&self, collection: &str) -> String {
        self.endpoint(&format!("api/collections/{collection}/records"))
    }
}
