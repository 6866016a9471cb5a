use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{CollectionConfig, DEFAULT_SAMPLE_SIZE, FieldKind, FieldSpec, SchemaRegistry};

const DEFAULT_REGISTRY: &str = include_str!("../registry/default.toml");

/// On-disk registry format (TOML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegistryFile {
    /// Sample size for collections that do not set their own.
    #[serde(default = "default_sample_size")]
    pub default_sample_size: u32,
    pub collections: Vec<CollectionEntry>,
}

/// A collection as written in a registry file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CollectionEntry {
    pub name: String,
    /// Bare names are string fields; objects carry an explicit type.
    pub fields: Vec<FieldEntry>,
    /// Legacy foreign-key list that upgrades bare fields to foreign keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyEntry>,
    /// Prompt template; supports `{sample_size}` and `{collection}`.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
}

/// Field declaration; accepts a bare name or a full spec.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldEntry {
    Name(String),
    Spec(FieldEntrySpec),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldEntrySpec {
    #[serde(alias = "field")]
    pub name: String,
    /// One of `string`, `numeric`, `boolean`, `null`, `foreign_key`.
    #[serde(rename = "type", default = "default_field_type")]
    pub kind: String,
    #[serde(
        default,
        alias = "relatedCollection",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_collection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyEntry {
    pub field: String,
    #[serde(alias = "relatedCollection")]
    pub related_collection: String,
}

fn default_sample_size() -> u32 {
    DEFAULT_SAMPLE_SIZE
}

fn default_field_type() -> String {
    "string".to_string()
}

impl RegistryFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| Error::InvalidRegistry(err.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|err| Error::InvalidRegistry(err.to_string()))
    }

    /// Read a registry file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::InvalidRegistry(format!("failed to read {}: {err}", path.display()))
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Normalize every field declaration into a typed [`FieldSpec`] and validate the result.
    pub fn into_registry(self) -> Result<SchemaRegistry> {
        let default_sample_size = self.default_sample_size;
        let collections = self
            .collections
            .into_iter()
            .map(|entry| normalize_collection(entry, default_sample_size))
            .collect::<Result<Vec<_>>>()?;
        SchemaRegistry::new(collections)
    }
}

/// The built-in brands / categories / products registry.
pub fn default_registry() -> Result<SchemaRegistry> {
    RegistryFile::from_toml_str(DEFAULT_REGISTRY)?.into_registry()
}

/// Load and normalize a registry file.
pub fn load_registry(path: &Path) -> Result<SchemaRegistry> {
    RegistryFile::load(path)?.into_registry()
}

fn normalize_collection(entry: CollectionEntry, default_sample_size: u32) -> Result<CollectionConfig> {
    let mut legacy_fks: BTreeMap<String, String> = BTreeMap::new();
    for fk in entry.foreign_keys {
        if legacy_fks
            .insert(fk.field.clone(), fk.related_collection)
            .is_some()
        {
            return Err(Error::InvalidRegistry(format!(
                "foreign key declared twice: {}.{}",
                entry.name, fk.field
            )));
        }
    }

    let mut fields = Vec::with_capacity(entry.fields.len());
    for field in entry.fields {
        let spec = match field {
            FieldEntry::Name(name) => match legacy_fks.remove(&name) {
                Some(related) => FieldSpec::foreign_key(name, related),
                None => FieldSpec::string(name),
            },
            FieldEntry::Spec(spec) => {
                let kind = parse_kind(&entry.name, &spec)?;
                let listed_as_fk = legacy_fks.remove(&spec.name).is_some();
                if listed_as_fk && !matches!(kind, FieldKind::ForeignKey { .. }) {
                    return Err(Error::InvalidRegistry(format!(
                        "field {}.{} is listed as a foreign key but typed {}",
                        entry.name,
                        spec.name,
                        kind.label()
                    )));
                }
                FieldSpec::new(spec.name, kind)
            }
        };
        fields.push(spec);
    }

    if let Some(field) = legacy_fks.keys().next() {
        return Err(Error::InvalidRegistry(format!(
            "foreign key names an undeclared field: {}.{}",
            entry.name, field
        )));
    }

    Ok(CollectionConfig {
        name: entry.name,
        fields,
        prompt_template: entry.prompt,
        sample_size: entry.sample_size.unwrap_or(default_sample_size),
    })
}

fn parse_kind(collection: &str, spec: &FieldEntrySpec) -> Result<FieldKind> {
    let kind = match spec.kind.as_str() {
        "string" => FieldKind::String,
        "numeric" | "number" => FieldKind::Numeric,
        "boolean" | "bool" => FieldKind::Boolean,
        "null" => FieldKind::Null,
        "foreign_key" | "foreignKey" => {
            let related_collection = spec.related_collection.clone().ok_or_else(|| {
                Error::InvalidRegistry(format!(
                    "foreign key without related collection: {collection}.{}",
                    spec.name
                ))
            })?;
            FieldKind::ForeignKey { related_collection }
        }
        other => {
            return Err(Error::InvalidRegistry(format!(
                "unknown field type '{other}': {collection}.{}",
                spec.name
            )));
        }
    };

    if spec.related_collection.is_some() && !matches!(kind, FieldKind::ForeignKey { .. }) {
        return Err(Error::InvalidRegistry(format!(
            "related collection on non foreign key field: {collection}.{}",
            spec.name
        )));
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_declares_products_foreign_keys() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.names(), vec!["brands", "categories", "products"]);

        let products = registry.get("products").unwrap();
        assert_eq!(products.dependencies(), vec!["categories", "brands"]);
        assert_eq!(products.sample_size, DEFAULT_SAMPLE_SIZE);
        let kinds: Vec<&str> = products.fields.iter().map(|f| f.kind.label()).collect();
        assert_eq!(
            kinds,
            vec![
                "string",
                "string",
                "numeric",
                "foreign_key",
                "foreign_key",
                "null",
                "boolean"
            ]
        );
        assert!(products.render_prompt().ends_with("for 10 products."));
    }

    #[test]
    fn json_registry_accepts_camel_case_specs() {
        let file = RegistryFile::from_json_str(
            r#"{
                "collections": [
                    {"name": "categories", "fields": ["name"], "prompt": "p", "sample_size": 3},
                    {"name": "products", "fields": [
                        "name",
                        {"field": "category", "type": "foreignKey", "relatedCollection": "categories"}
                    ], "prompt": "p"}
                ]
            }"#,
        )
        .unwrap();
        let registry = file.into_registry().unwrap();
        let products = registry.get("products").unwrap();
        assert_eq!(products.fields[1], FieldSpec::foreign_key("category", "categories"));
        assert_eq!(products.sample_size, DEFAULT_SAMPLE_SIZE);
        assert_eq!(registry.get("categories").unwrap().sample_size, 3);
    }

    #[test]
    fn rejects_unknown_types_and_dangling_legacy_keys() {
        let unknown = RegistryFile::from_toml_str(
            r#"
            [[collections]]
            name = "brands"
            fields = [{ name = "founded", type = "date" }]
            prompt = "p"
            "#,
        )
        .unwrap()
        .into_registry();
        assert!(matches!(unknown, Err(Error::InvalidRegistry(_))));

        let dangling = RegistryFile::from_toml_str(
            r#"
            [[collections]]
            name = "brands"
            fields = ["brand_name"]
            foreign_keys = [{ field = "owner", related_collection = "users" }]
            prompt = "p"
            "#,
        )
        .unwrap()
        .into_registry();
        assert!(matches!(dangling, Err(Error::InvalidRegistry(_))));

        let missing_target = RegistryFile::from_toml_str(
            r#"
            [[collections]]
            name = "products"
            fields = [{ name = "brand", type = "foreign_key" }]
            prompt = "p"
            "#,
        )
        .unwrap()
        .into_registry();
        assert!(matches!(missing_target, Err(Error::InvalidRegistry(_))));
    }

    #[test]
    fn foreign_key_to_missing_collection_is_unknown() {
        let result = RegistryFile::from_toml_str(
            r#"
            [[collections]]
            name = "products"
            fields = ["brand"]
            foreign_keys = [{ field = "brand", related_collection = "brands" }]
            prompt = "p"
            "#,
        )
        .unwrap()
        .into_registry();
        assert!(matches!(result, Err(Error::UnknownCollection(name)) if name == "brands"));
    }
}
