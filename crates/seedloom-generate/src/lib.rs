//! Dependency-ordered seeding pipeline for seedloom.
//!
//! This crate enriches prompts with already-created records, coerces generated items into
//! typed records, and drives generator and store collaborators collection by collection.

pub mod coerce;
pub mod engine;
pub mod enrich;
pub mod errors;
pub mod foreign;
pub mod model;
pub mod planner;

pub use coerce::{coerce_batch, coerce_item};
pub use engine::SeedEngine;
pub use enrich::{EntityRef, enrich_prompt, entity_refs};
pub use errors::SeedError;
pub use foreign::{IdSelector, RandomSelector, repair_foreign_key};
pub use model::{
    CollectionReport, CollectionStatus, SeedIssue, SeedOptions, SeedOutcome, SeedReport, Stage,
};
pub use planner::{CollectionTask, TaskMode, plan_collections};
