use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::validate_registry;

/// Sample size used when a collection does not declare one.
pub const DEFAULT_SAMPLE_SIZE: u32 = 10;

/// Value kind expected for a field, with the foreign-key target when relevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form value, kept as generated.
    String,
    /// Numeric value, parsed from strings when needed.
    Numeric,
    /// Boolean value, `"true"` (any case) for textual input.
    Boolean,
    /// Always stored as null.
    Null,
    /// Id of a record in another collection.
    ForeignKey { related_collection: String },
}

impl FieldKind {
    /// Stable lowercase label used in prompts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Numeric => "numeric",
            FieldKind::Boolean => "boolean",
            FieldKind::Null => "null",
            FieldKind::ForeignKey { .. } => "foreign_key",
        }
    }
}

/// A single field of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Numeric)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Null)
    }

    pub fn foreign_key(name: impl Into<String>, related_collection: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::ForeignKey {
                related_collection: related_collection.into(),
            },
        )
    }

    /// Target collection when this field is a foreign key.
    pub fn related_collection(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::ForeignKey { related_collection } => Some(related_collection),
            _ => None,
        }
    }
}

/// Generation settings for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CollectionConfig {
    pub name: String,
    /// Ordered field list; defines record shape and coercion order.
    pub fields: Vec<FieldSpec>,
    /// Prompt text; `{sample_size}` and `{collection}` are substituted on render.
    pub prompt_template: String,
    pub sample_size: u32,
}

impl CollectionConfig {
    /// Collections referenced by foreign-key fields, in field order, without repeats.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        for related in self.fields.iter().filter_map(FieldSpec::related_collection) {
            if !deps.contains(&related) {
                deps.push(related);
            }
        }
        deps
    }

    pub fn foreign_key_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.related_collection().is_some())
    }

    pub fn render_prompt(&self) -> String {
        self.prompt_template
            .replace("{sample_size}", &self.sample_size.to_string())
            .replace("{collection}", &self.name)
    }

    /// Copy of this config with a different sample size.
    pub fn with_sample_size(&self, sample_size: u32) -> Self {
        Self {
            sample_size,
            ..self.clone()
        }
    }
}

/// Immutable, validated set of collection configs in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRegistry {
    collections: Vec<CollectionConfig>,
}

impl SchemaRegistry {
    /// Build a registry, rejecting duplicates, empty collections and dangling foreign keys.
    pub fn new(collections: Vec<CollectionConfig>) -> Result<Self> {
        validate_registry(&collections)?;
        Ok(Self { collections })
    }

    pub fn get(&self, name: &str) -> Result<&CollectionConfig> {
        self.collections
            .iter()
            .find(|config| config.name == name)
            .ok_or_else(|| Error::UnknownCollection(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.iter().any(|config| config.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectionConfig> {
        self.collections.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.collections
            .iter()
            .map(|config| config.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl<'a> IntoIterator for &'a SchemaRegistry {
    type Item = &'a CollectionConfig;
    type IntoIter = std::slice::Iter<'a, CollectionConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> CollectionConfig {
        CollectionConfig {
            name: "products".to_string(),
            fields: vec![
                FieldSpec::string("name"),
                FieldSpec::foreign_key("category", "categories"),
                FieldSpec::foreign_key("brand", "brands"),
                FieldSpec::foreign_key("alt_category", "categories"),
            ],
            prompt_template: "Generate {sample_size} {collection}.".to_string(),
            sample_size: 4,
        }
    }

    #[test]
    fn dependencies_follow_field_order_without_repeats() {
        assert_eq!(products().dependencies(), vec!["categories", "brands"]);
    }

    #[test]
    fn render_prompt_substitutes_placeholders() {
        assert_eq!(products().render_prompt(), "Generate 4 products.");
        assert_eq!(
            products().with_sample_size(7).render_prompt(),
            "Generate 7 products."
        );
    }

    #[test]
    fn field_spec_serializes_with_type_tag() {
        let value = serde_json::to_value(FieldSpec::foreign_key("brand", "brands")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "brand",
                "type": "foreign_key",
                "related_collection": "brands"
            })
        );
    }

    #[test]
    fn lookup_of_unknown_collection_fails() {
        let registry = SchemaRegistry::new(vec![CollectionConfig {
            name: "brands".to_string(),
            fields: vec![FieldSpec::string("brand_name")],
            prompt_template: String::new(),
            sample_size: 1,
        }])
        .unwrap();

        assert!(registry.get("brands").is_ok());
        assert!(matches!(
            registry.get("products"),
            Err(Error::UnknownCollection(name)) if name == "products"
        ));
    }
}
