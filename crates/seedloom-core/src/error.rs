use thiserror::Error;

/// Core error type shared across seedloom crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A collection name was not found in the registry.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    /// The foreign-key graph has no valid processing order.
    #[error("dependency cycle between collections: {}", .collections.join(", "))]
    DependencyCycle { collections: Vec<String> },
    /// The registry violates internal invariants.
    #[error("invalid registry: {0}")]
    InvalidRegistry(String),
    /// The generator produced no usable array of records.
    #[error("generation failed: {0}")]
    Generation(String),
    /// The store rejected the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The store failed to create or list records.
    #[error("persistence failed: {0}")]
    Persistence(String),
}

/// Convenience alias for results returned by seedloom crates.
pub type Result<T> = std::result::Result<T, Error>;
