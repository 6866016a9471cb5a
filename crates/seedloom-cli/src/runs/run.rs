use std::collections::BTreeMap;
use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use seedloom_core::{GeneratedRecord, RedactedEndpoint};
use seedloom_generate::SeedReport;

use super::atomic::write_json_atomic;
use super::RunResult;

/// Serializable options for runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub registry: String,
    pub collections: Vec<String>,
    pub sample_size: Option<u32>,
    pub seed: Option<u64>,
    pub reuse: Vec<String>,
    pub call_timeout_secs: u64,
    pub dry_run: bool,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub schema_version: String,
    pub run_dir: PathBuf,
    pub generator: String,
    pub model: String,
    pub llm_endpoint: RedactedEndpoint,
    pub store: String,
    pub store_endpoint: RedactedEndpoint,
    pub options: RunOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub schema_version: String,
    pub generator: String,
    pub model: String,
    pub llm_endpoint: RedactedEndpoint,
    pub store: String,
    pub store_endpoint: RedactedEndpoint,
    pub options: RunOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
    pub cache_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RunResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let paths = RunPaths {
        config_path: root.join("config.json"),
        logs_path: root.join("logs.ndjson"),
        report_path: root.join("report.json"),
        cache_path: root.join("cache.json"),
        root,
    };

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        schema_version: ctx.schema_version.clone(),
        generator: ctx.generator.clone(),
        model: ctx.model.clone(),
        llm_endpoint: ctx.llm_endpoint.clone(),
        store: ctx.store.clone(),
        store_endpoint: ctx.store_endpoint.clone(),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };
    write_json_atomic(&paths.config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_report(paths: &RunPaths, report: &SeedReport) -> RunResult<()> {
    write_json_atomic(&paths.report_path, report)
}

pub fn write_cache(
    paths: &RunPaths,
    cache: &BTreeMap<String, Vec<GeneratedRecord>>,
) -> RunResult<()> {
    write_json_atomic(&paths.cache_path, cache)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

impl RunPaths {
    pub fn root(&self) -> &Path {
        &self.root
    }
}
