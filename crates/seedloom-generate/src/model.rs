use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use seedloom_core::GeneratedRecord;

use crate::errors::SeedError;

/// Options for the seeding engine.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Overrides every collection's sample size.
    pub sample_size: Option<u32>,
    /// Collections loaded from the store instead of generated.
    pub reuse: BTreeSet<String>,
    /// Upper bound for each generator or store call. It wraps the collaborator's own
    /// retries, so it must cover all of them or later attempts never run.
    pub call_timeout: Duration,
    /// Run id to report under; a fresh one is generated when unset.
    pub run_id: Option<String>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            sample_size: None,
            reuse: BTreeSet::new(),
            // Three 120 s model attempts plus backoff.
            call_timeout: Duration::from_secs(362),
            run_id: None,
        }
    }
}

/// Pipeline step an issue was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Authenticate,
    Sort,
    Generate,
    Coerce,
    Persist,
    Reuse,
}

/// Structured error entry in a run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedIssue {
    pub code: String,
    pub stage: Stage,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Position of the record within the collection's batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
}

impl SeedIssue {
    pub fn new(stage: Stage, collection: Option<&str>, error: &SeedError) -> Self {
        Self {
            code: error.code().to_string(),
            stage,
            message: error.to_string(),
            collection: collection.map(str::to_string),
            record: None,
        }
    }

    pub fn for_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }
}

/// Outcome of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Every record was created.
    Succeeded,
    /// Some records failed to persist.
    Partial,
    /// Nothing was created.
    Failed,
    /// Cache seeded from existing store records.
    Reused,
}

/// Summary of a processed collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub collection: String,
    pub status: CollectionStatus,
    pub requested: u32,
    pub generated: usize,
    pub created: usize,
    pub failed_records: usize,
    pub duration_ms: u64,
}

/// Aggregate result of a seeding run.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub run_id: String,
    pub started_at: String,
    pub success: bool,
    pub order: Vec<String>,
    pub collections: Vec<CollectionReport>,
    pub issues: Vec<SeedIssue>,
    pub duration_ms: u64,
}

impl SeedReport {
    pub fn new(run_id: String, started_at: String) -> Self {
        Self {
            run_id,
            started_at,
            success: false,
            order: Vec::new(),
            collections: Vec::new(),
            issues: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn record_issue(&mut self, issue: SeedIssue) {
        self.issues.push(issue);
    }

    pub fn issues_by_code(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.code.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn created_total(&self) -> usize {
        self.collections.iter().map(|report| report.created).sum()
    }
}

/// Report plus the records committed during the run, keyed by collection.
#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub report: SeedReport,
    pub cache: BTreeMap<String, Vec<GeneratedRecord>>,
}

impl SeedOutcome {
    pub fn success(&self) -> bool {
        self.report.success
    }
}
