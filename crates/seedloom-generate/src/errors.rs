use thiserror::Error;

use seedloom_core::Error as CoreError;

/// Errors emitted by the seeding pipeline.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Registry, ordering and collaborator failures.
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("item {item} of '{collection}' is missing required field '{field}'")]
    MissingField {
        collection: String,
        item: usize,
        field: String,
    },
    #[error("item {item} of '{collection}' has non-numeric value {value} for field '{field}'")]
    InvalidNumeric {
        collection: String,
        item: usize,
        field: String,
        value: String,
    },
    #[error("no '{related}' records to reference from '{collection}.{field}'")]
    EmptyForeignKeyPool {
        collection: String,
        field: String,
        related: String,
    },
}

impl SeedError {
    /// Stable snake_case code used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            SeedError::Core(CoreError::UnknownCollection(_)) => "unknown_collection",
            SeedError::Core(CoreError::DependencyCycle { .. }) => "dependency_cycle",
            SeedError::Core(CoreError::InvalidRegistry(_)) => "invalid_registry",
            SeedError::Core(CoreError::Generation(_)) => "generation",
            SeedError::Core(CoreError::Authentication(_)) => "authentication",
            SeedError::Core(CoreError::Persistence(_)) => "persistence",
            SeedError::MissingField { .. } => "missing_field",
            SeedError::InvalidNumeric { .. } => "invalid_numeric",
            SeedError::EmptyForeignKeyPool { .. } => "empty_foreign_key_pool",
        }
    }

    /// Whether the error stops the whole run rather than one collection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SeedError::Core(
                CoreError::Authentication(_)
                    | CoreError::DependencyCycle { .. }
                    | CoreError::UnknownCollection(_)
                    | CoreError::InvalidRegistry(_)
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;
