use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use seedloom_core::{Credentials, GeneratedRecord, RecordStore, Result, Session};

use crate::error::StoreError;

type RejectFn = dyn Fn(&str, &GeneratedRecord) -> bool + Send + Sync;

/// In-process store with PocketBase-style ids.
#[derive(Default)]
pub struct MemoryStore {
    credentials: Option<Credentials>,
    reject: Option<Box<RejectFn>>,
    collections: Mutex<BTreeMap<String, Vec<GeneratedRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only these credentials authenticate; without them any login succeeds.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Refuse records for which `predicate(collection, record)` holds.
    pub fn with_rejection<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &GeneratedRecord) -> bool + Send + Sync + 'static,
    {
        self.reject = Some(Box::new(predicate));
        self
    }

    /// Pre-populate a collection; records without an id get one.
    pub fn with_records(
        self,
        collection: &str,
        records: impl IntoIterator<Item = GeneratedRecord>,
    ) -> Self {
        if let Ok(mut collections) = self.collections.lock() {
            let stored = collections.entry(collection.to_string()).or_default();
            stored.extend(records.into_iter().map(assign_id));
        }
        self
    }

    pub fn records(&self, collection: &str) -> Vec<GeneratedRecord> {
        self.collections
            .lock()
            .ok()
            .and_then(|collections| collections.get(collection).cloned())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<GeneratedRecord>> {
        self.collections
            .lock()
            .map(|collections| collections.clone())
            .unwrap_or_default()
    }
}

fn assign_id(mut record: GeneratedRecord) -> GeneratedRecord {
    if record.id.is_none() {
        record.id = Some(new_record_id());
    }
    record
}

/// 15 lowercase alphanumerics, the shape of a PocketBase record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..15].to_string()
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        if let Some(expected) = &self.credentials {
            if expected.identity != credentials.identity || expected.password != credentials.password
            {
                return Err(StoreError::InvalidCredentials.into_authentication());
            }
        }
        Ok(Session {
            identity: credentials.identity.clone(),
            token: format!("memory-{}", new_record_id()),
        })
    }

    async fn create_record(
        &self,
        collection: &str,
        record: &GeneratedRecord,
    ) -> Result<GeneratedRecord> {
        if let Some(reject) = &self.reject {
            if reject(collection, record) {
                let label = record.label().unwrap_or_else(|| "record".to_string());
                return Err(StoreError::Rejected(label).into_persistence());
            }
        }

        let created = GeneratedRecord::with_id(new_record_id(), record.values.clone());
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Rejected("store lock poisoned".to_string()).into_persistence())?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn get_full_list(&self, collection: &str) -> Result<Vec<GeneratedRecord>> {
        Ok(self.records(collection))
    }
}
