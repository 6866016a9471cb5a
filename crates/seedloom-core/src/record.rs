use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely typed object as produced by a generator.
pub type RawItem = Map<String, Value>;

/// A record shaped by a collection's field list, with the store id once persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field values in field-spec order.
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl GeneratedRecord {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { id: None, values }
    }

    pub fn with_id(id: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            id: Some(id.into()),
            values,
        }
    }

    /// Split a store response object into its id and remaining fields.
    pub fn from_store_object(mut object: Map<String, Value>) -> Option<Self> {
        let id = match object.shift_remove("id")? {
            Value::String(id) if !id.is_empty() => id,
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        Some(Self::with_id(id, object))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Human-readable label: `name`, then `brand_name`, then the id.
    pub fn label(&self) -> Option<String> {
        ["name", "brand_name"]
            .iter()
            .filter_map(|field| self.values.get(*field))
            .find_map(label_text)
            .or_else(|| self.id.clone())
    }
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Records committed per collection during a single run.
///
/// Entries only grow: there is no way to remove or replace records once appended.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationCache {
    entries: BTreeMap<String, Vec<GeneratedRecord>>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to a collection's entry, creating it when absent.
    pub fn extend(&mut self, collection: &str, records: impl IntoIterator<Item = GeneratedRecord>) {
        self.entries
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }

    pub fn records(&self, collection: &str) -> Option<&[GeneratedRecord]> {
        self.entries.get(collection).map(Vec::as_slice)
    }

    /// Ids of a collection's records; empty when the entry is missing.
    pub fn ids(&self, collection: &str) -> Vec<&str> {
        self.records(collection)
            .unwrap_or_default()
            .iter()
            .filter_map(|record| record.id.as_deref())
            .collect()
    }

    pub fn has_records(&self, collection: &str) -> bool {
        !self.ids(collection).is_empty()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.records(collection).map_or(0, <[GeneratedRecord]>::len)
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<GeneratedRecord>> {
        self.entries
    }
}
