//! Core contracts and helpers for seedloom.
//!
//! This crate defines the collection registry, dependency ordering, the run-scoped
//! generation cache and the collaborator traits implemented by generator and store adapters.

pub mod collab;
pub mod error;
pub mod file;
pub mod graph;
pub mod record;
pub mod redaction;
pub mod schema;
pub mod validation;

pub use collab::{Credentials, Generator, RecordStore, Session};
pub use error::{Error, Result};
pub use file::{
    CollectionEntry, FieldEntry, FieldEntrySpec, ForeignKeyEntry, RegistryFile, default_registry,
    load_registry,
};
pub use graph::{DependencyReport, DependencySummary, build_dependency_report, sort_collections};
pub use record::{GeneratedRecord, GenerationCache, RawItem};
pub use redaction::{RedactedEndpoint, redact_endpoint};
pub use schema::{CollectionConfig, DEFAULT_SAMPLE_SIZE, FieldKind, FieldSpec, SchemaRegistry};
pub use validation::validate_registry;

/// Current contract version for registry and report artifacts.
pub const SCHEMA_VERSION: &str = "0.1";
