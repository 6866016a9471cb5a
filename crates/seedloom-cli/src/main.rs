mod config;
mod runs;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use seedloom_core::{
    Credentials, Error as CoreError, Generator, RecordStore, RegistryFile, SCHEMA_VERSION,
    SchemaRegistry, build_dependency_report, default_registry, load_registry, redact_endpoint,
};
use seedloom_generate::{IdSelector, RandomSelector, SeedEngine, SeedOptions};
use seedloom_llm::{ENV_API_KEY, LlmError, LlmGenerator};
use seedloom_store::{MemoryStore, PocketBaseStore, StoreError};
use thiserror::Error;
use uuid::Uuid;

use config::{ConfigError, EnvSource, Settings, load_settings};
use runs::{RunContext, RunOptions, init_run_logging, start_run, write_cache, write_report};

#[derive(Debug, Error)]
enum CliError {
    #[error("run artifact error: {0}")]
    Run(#[from] runs::RunError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Core(#[from] CoreError),
    #[error("generator error: {0}")]
    Llm(#[from] LlmError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seeding run {run_id} finished with {issues} issue(s)")]
    RunFailed { run_id: String, issues: usize },
}

#[derive(Parser, Debug)]
#[command(name = "seedloom", version, about = "Seed a record store with model-generated data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and persist records for every collection.
    Run(RunArgs),
    /// Print the dependency report for a registry.
    Order(RegistryArgs),
    /// Validate a registry and print it normalized.
    Registry(RegistryArgs),
    /// Print the JSON Schema of the registry file format.
    RegistrySchema,
}

#[derive(Args, Debug)]
struct RegistryArgs {
    /// Registry file (TOML or JSON); the built-in catalogue when omitted.
    #[arg(long, value_name = "FILE")]
    registry: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    registry: RegistryArgs,
    /// Settings file; an explicitly passed file must exist.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Records requested per collection, overriding the registry.
    #[arg(long)]
    sample_size: Option<u32>,
    /// Seed for foreign-key repair.
    #[arg(long)]
    seed: Option<u64>,
    /// Load this collection from the store instead of generating it.
    #[arg(long, value_name = "COLLECTION")]
    reuse: Vec<String>,
    /// Persist into an in-memory store instead of PocketBase.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, value_name = "URL")]
    store_url: Option<String>,
    #[arg(long, value_name = "URL")]
    llm_base_url: Option<String>,
    #[arg(long, value_name = "MODEL")]
    llm_model: Option<String>,
    /// Upper bound for each model or store call.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Credentials file; an explicitly passed file must exist.
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = "seedloom.toml";
const DEFAULT_ENV_FILE: &str = ".env";

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_seed(args).await,
        Command::Order(args) => print_order(args),
        Command::Registry(args) => print_registry(args),
        Command::RegistrySchema => print_registry_schema(),
    }
}

fn resolve_registry(args: &RegistryArgs) -> Result<(SchemaRegistry, String), CliError> {
    match &args.registry {
        Some(path) => Ok((load_registry(path)?, path.display().to_string())),
        None => Ok((default_registry()?, "builtin".to_string())),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_order(args: RegistryArgs) -> Result<(), CliError> {
    let (registry, _) = resolve_registry(&args)?;
    print_json(&build_dependency_report(&registry)?)
}

fn print_registry(args: RegistryArgs) -> Result<(), CliError> {
    let (registry, _) = resolve_registry(&args)?;
    print_json(&registry)
}

fn print_registry_schema() -> Result<(), CliError> {
    print_json(&schemars::schema_for!(RegistryFile))
}

/// Optional-by-default file: the default path may be absent, an explicit one may not.
fn optional_path(explicit: Option<PathBuf>, default: &str) -> (PathBuf, bool) {
    match explicit {
        Some(path) => (path, true),
        None => (PathBuf::from(default), false),
    }
}

fn apply_overrides(settings: &mut Settings, args: &RunArgs, env: &EnvSource) {
    settings.llm = std::mem::take(&mut settings.llm).with_env(|key| env.get(key));
    if let Some(url) = &args.store_url {
        settings.store.url = url.clone();
    }
    if let Some(base_url) = &args.llm_base_url {
        settings.llm.base_url = base_url.clone();
    }
    if let Some(model) = &args.llm_model {
        settings.llm.model = model.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        settings.run.call_timeout_secs = Some(timeout);
    }
    if args.sample_size.is_some() {
        settings.run.sample_size = args.sample_size;
    }
}

async fn run_seed(args: RunArgs) -> Result<(), CliError> {
    let (config_path, config_required) = optional_path(args.config.clone(), DEFAULT_CONFIG);
    let (env_path, env_required) = optional_path(args.env_file.clone(), DEFAULT_ENV_FILE);

    let mut settings = load_settings(&config_path, config_required)?;
    let env = EnvSource::load(&env_path, env_required)?;
    apply_overrides(&mut settings, &args, &env);

    let (registry, registry_source) = resolve_registry(&args.registry)?;

    let credentials = match env.store_credentials() {
        Ok(credentials) => credentials,
        Err(_) if args.dry_run => Credentials::new("dry-run@localhost", ""),
        Err(err) => return Err(err.into()),
    };

    let run_id = Uuid::new_v4().to_string();
    let call_timeout = settings.call_timeout();
    let options = SeedOptions {
        sample_size: settings.run.sample_size,
        reuse: args.reuse.iter().cloned().collect::<BTreeSet<_>>(),
        call_timeout,
        run_id: Some(run_id.clone()),
    };

    let generator = LlmGenerator::new(settings.llm.clone())?;
    let store: Box<dyn RecordStore> = if args.dry_run {
        Box::new(MemoryStore::new())
    } else {
        Box::new(PocketBaseStore::new(settings.store.clone())?)
    };

    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        schema_version: SCHEMA_VERSION.to_string(),
        run_dir: args.run_dir.clone(),
        generator: generator.name().to_string(),
        model: settings.llm.model.clone(),
        llm_endpoint: redact_endpoint(&settings.llm.base_url),
        store: store.kind().to_string(),
        store_endpoint: redact_endpoint(&settings.store.url),
        options: RunOptions {
            registry: registry_source,
            collections: registry.names().into_iter().map(str::to_string).collect(),
            sample_size: options.sample_size,
            seed: args.seed,
            reuse: options.reuse.iter().cloned().collect(),
            call_timeout_secs: call_timeout.as_secs(),
            dry_run: args.dry_run,
        },
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;
    tracing::info!(
        event = "cli_started",
        run_id = %run_id,
        api_key_set = env.get(ENV_API_KEY).is_some(),
        dry_run = args.dry_run
    );

    let mut selector: Box<dyn IdSelector> = match args.seed {
        Some(seed) => Box::new(RandomSelector::seeded(seed)),
        None => Box::new(RandomSelector::from_entropy()),
    };

    let outcome = SeedEngine::new(options)
        .run(
            &registry,
            &generator,
            store.as_ref(),
            &credentials,
            selector.as_mut(),
        )
        .await;

    write_report(&run_paths, &outcome.report)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());
    write_cache(&run_paths, &outcome.cache)?;
    tracing::info!(event = "cache_written", path = %run_paths.cache_path.display());

    print_summary(run_paths.root(), &outcome.report)?;

    if !outcome.success() {
        return Err(CliError::RunFailed {
            run_id,
            issues: outcome.report.issues.len(),
        });
    }
    Ok(())
}

fn print_summary(root: &Path, report: &seedloom_generate::SeedReport) -> Result<(), CliError> {
    print_json(&serde_json::json!({
        "run_id": report.run_id,
        "run_dir": root.display().to_string(),
        "success": report.success,
        "order": report.order,
        "created": report.created_total(),
        "issues": report.issues_by_code(),
    }))
}
