use seedloom_core::{CollectionConfig, Error as CoreError, SchemaRegistry, sort_collections};

use crate::errors::Result;
use crate::model::SeedOptions;

/// How a collection's cache entry gets filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMode {
    Generate,
    /// Load existing store records instead of generating.
    Reuse,
}

/// Planned work for a collection, in processing order.
#[derive(Debug, Clone)]
pub struct CollectionTask {
    pub config: CollectionConfig,
    pub mode: TaskMode,
}

/// Build the dependency-ordered task list, applying option overrides.
pub fn plan_collections(
    registry: &SchemaRegistry,
    options: &SeedOptions,
) -> Result<Vec<CollectionTask>> {
    if let Some(unknown) = options.reuse.iter().find(|name| !registry.contains(name)) {
        return Err(CoreError::UnknownCollection(unknown.clone()).into());
    }
    if options.sample_size == Some(0) {
        return Err(CoreError::InvalidRegistry("sample size must be positive".to_string()).into());
    }

    let order = sort_collections(registry)?;

    Ok(order
        .into_iter()
        .map(|config| {
            let config = match options.sample_size {
                Some(size) => config.with_sample_size(size),
                None => config.clone(),
            };
            let mode = if options.reuse.contains(&config.name) {
                TaskMode::Reuse
            } else {
                TaskMode::Generate
            };
            CollectionTask { config, mode }
        })
        .collect())
}
