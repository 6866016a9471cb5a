use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{GeneratedRecord, RawItem};
use crate::schema::FieldSpec;

/// Trait implemented by text-model adapters that produce raw records.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Identifier used in logs and run artifacts (e.g. `openai-compatible`).
    fn name(&self) -> &str;

    /// Turn a prompt into an array of raw objects.
    ///
    /// Fails with [`crate::Error::Generation`] when the response is not a JSON array.
    async fn generate(&self, prompt: &str, fields: &[FieldSpec]) -> Result<Vec<RawItem>>;
}

/// Trait implemented by record stores.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the store identifier (e.g. `pocketbase`).
    fn kind(&self) -> &'static str;

    /// Fails with [`crate::Error::Authentication`].
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session>;

    /// Create one record; the returned record carries the store-assigned id.
    ///
    /// Fails with [`crate::Error::Persistence`].
    async fn create_record(&self, collection: &str, record: &GeneratedRecord)
    -> Result<GeneratedRecord>;

    /// Every record currently stored in a collection.
    async fn get_full_list(&self, collection: &str) -> Result<Vec<GeneratedRecord>>;
}

/// Login identity for a record store.
#[derive(Clone)]
pub struct Credentials {
    pub identity: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("password", &"***")
            .finish()
    }
}

/// Authenticated session returned by a store.
#[derive(Clone)]
pub struct Session {
    pub identity: String,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials::new("admin@example.com", "hunter2");
        let session = Session {
            identity: "admin@example.com".to_string(),
            token: "eyJhbGciOi".to_string(),
        };

        let rendered = format!("{credentials:?} {session:?}");
        assert!(rendered.contains("admin@example.com"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("eyJhbGciOi"));
    }
}
