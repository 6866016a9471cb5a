use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::CollectionConfig;

/// Validate internal consistency of a set of collection configs.
///
/// This checks:
/// - empty or duplicate collection names
/// - empty field lists, duplicate field names and the reserved `id` field
/// - zero sample sizes
/// - foreign keys pointing at collections outside the set
pub fn validate_registry(collections: &[CollectionConfig]) -> Result<()> {
    let mut names = BTreeSet::new();

    for config in collections {
        if config.name.trim().is_empty() {
            return Err(Error::InvalidRegistry(
                "collection name must not be empty".to_string(),
            ));
        }
        if !names.insert(config.name.as_str()) {
            return Err(Error::InvalidRegistry(format!(
                "duplicate collection name: {}",
                config.name
            )));
        }
        if config.sample_size == 0 {
            return Err(Error::InvalidRegistry(format!(
                "sample size must be positive: {}",
                config.name
            )));
        }
        if config.fields.is_empty() {
            return Err(Error::InvalidRegistry(format!(
                "collection has no fields: {}",
                config.name
            )));
        }

        let mut fields = BTreeSet::new();
        for field in &config.fields {
            if field.name == "id" {
                return Err(Error::InvalidRegistry(format!(
                    "field name 'id' is reserved: {}",
                    config.name
                )));
            }
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidRegistry(format!(
                    "duplicate field name: {}.{}",
                    config.name, field.name
                )));
            }
        }
    }

    for config in collections {
        for related in config.dependencies() {
            if !names.contains(related) {
                return Err(Error::UnknownCollection(related.to_string()));
            }
        }
    }

    Ok(())
}
