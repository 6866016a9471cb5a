use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use seedloom_core::{
    CollectionConfig, Credentials, Error as CoreError, GeneratedRecord, GenerationCache,
    Generator, RecordStore, SchemaRegistry,
};

use crate::coerce::coerce_batch;
use crate::enrich::enrich_prompt;
use crate::errors::SeedError;
use crate::foreign::IdSelector;
use crate::model::{
    CollectionReport, CollectionStatus, SeedIssue, SeedOptions, SeedOutcome, SeedReport, Stage,
};
use crate::planner::{CollectionTask, TaskMode, plan_collections};

/// Entry point for seeding a store from a collection registry.
#[derive(Debug, Clone, Default)]
pub struct SeedEngine {
    options: SeedOptions,
}

impl SeedEngine {
    pub fn new(options: SeedOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    /// Run the whole pipeline once.
    ///
    /// Authentication and ordering failures end the run before any collection is touched;
    /// every other failure is recorded and the next collection is attempted.
    pub async fn run(
        &self,
        registry: &SchemaRegistry,
        generator: &dyn Generator,
        store: &dyn RecordStore,
        credentials: &Credentials,
        selector: &mut dyn IdSelector,
    ) -> SeedOutcome {
        let start = Instant::now();
        let run_id = self
            .options
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut report = SeedReport::new(run_id.clone(), chrono::Utc::now().to_rfc3339());
        let mut cache = GenerationCache::new();

        info!(
            event = "run_started",
            run_id = %run_id,
            collections = registry.len(),
            generator = generator.name(),
            store = store.kind()
        );

        let authenticated = bounded(
            self.options.call_timeout,
            store.authenticate(credentials),
            CoreError::Authentication,
        )
        .await;
        match authenticated {
            Ok(session) => info!(identity = %session.identity, "store authenticated"),
            Err(err) => {
                let err = SeedError::from(err);
                warn!(error = %err, "authentication failed");
                report.record_issue(SeedIssue::new(Stage::Authenticate, None, &err));
                return finish(report, cache, start);
            }
        }

        let tasks = match plan_collections(registry, &self.options) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "no processing order");
                report.record_issue(SeedIssue::new(Stage::Sort, None, &err));
                return finish(report, cache, start);
            }
        };
        report.order = tasks.iter().map(|task| task.config.name.clone()).collect();
        info!(event = "order_resolved", order = ?report.order);

        for task in &tasks {
            let collection_start = Instant::now();
            info!(
                event = "collection_started",
                collection = %task.config.name,
                mode = ?task.mode,
                requested = task.config.sample_size
            );

            let mut summary = match task.mode {
                TaskMode::Generate => {
                    self.generate_collection(
                        task,
                        generator,
                        store,
                        selector,
                        &mut cache,
                        &mut report,
                    )
                    .await
                }
                TaskMode::Reuse => {
                    self.reuse_collection(task, store, &mut cache, &mut report)
                        .await
                }
            };
            summary.duration_ms = collection_start.elapsed().as_millis() as u64;

            info!(
                event = "collection_finished",
                collection = %summary.collection,
                status = ?summary.status,
                generated = summary.generated,
                created = summary.created,
                failed_records = summary.failed_records,
                duration_ms = summary.duration_ms
            );
            report.collections.push(summary);
        }

        report.success = report.issues.is_empty();
        finish(report, cache, start)
    }

    async fn generate_collection(
        &self,
        task: &CollectionTask,
        generator: &dyn Generator,
        store: &dyn RecordStore,
        selector: &mut dyn IdSelector,
        cache: &mut GenerationCache,
        report: &mut SeedReport,
    ) -> CollectionReport {
        let config = &task.config;
        let mut summary = empty_summary(config, CollectionStatus::Failed);

        if let Some(err) = missing_dependency(config, cache) {
            warn!(collection = %config.name, error = %err, "dependency has no records");
            report.record_issue(SeedIssue::new(Stage::Generate, Some(&config.name), &err));
            cache.extend(&config.name, Vec::new());
            return summary;
        }

        let prompt = enrich_prompt(config, cache);
        debug!(collection = %config.name, prompt_len = prompt.len(), "prompt enriched");

        let generated = bounded(
            self.options.call_timeout,
            generator.generate(&prompt, &config.fields),
            CoreError::Generation,
        )
        .await
        .and_then(|items| {
            if items.is_empty() {
                Err(CoreError::Generation("generator returned no records".to_string()))
            } else {
                Ok(items)
            }
        });
        let items = match generated {
            Ok(items) => items,
            Err(err) => {
                let err = SeedError::from(err);
                warn!(collection = %config.name, error = %err, "generation failed");
                report.record_issue(SeedIssue::new(Stage::Generate, Some(&config.name), &err));
                cache.extend(&config.name, Vec::new());
                return summary;
            }
        };
        summary.generated = items.len();
        if items.len() != config.sample_size as usize {
            warn!(
                collection = %config.name,
                requested = config.sample_size,
                generated = items.len(),
                "generator returned a different number of records"
            );
        }

        let records = match coerce_batch(config, &items, cache, selector) {
            Ok(records) => records,
            Err(err) => {
                warn!(collection = %config.name, error = %err, "batch rejected");
                report.record_issue(SeedIssue::new(Stage::Coerce, Some(&config.name), &err));
                cache.extend(&config.name, Vec::new());
                return summary;
            }
        };

        let created = self
            .persist_records(config, &records, store, &mut summary, report)
            .await;
        summary.created = created.len();
        summary.status = if summary.failed_records == 0 {
            CollectionStatus::Succeeded
        } else if created.is_empty() {
            CollectionStatus::Failed
        } else {
            CollectionStatus::Partial
        };
        cache.extend(&config.name, created);

        summary
    }

    async fn persist_records(
        &self,
        config: &CollectionConfig,
        records: &[GeneratedRecord],
        store: &dyn RecordStore,
        summary: &mut CollectionReport,
        report: &mut SeedReport,
    ) -> Vec<GeneratedRecord> {
        let mut created = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let result = bounded(
                self.options.call_timeout,
                store.create_record(&config.name, record),
                CoreError::Persistence,
            )
            .await;
            match result {
                Ok(record) => created.push(record),
                Err(err) => {
                    let err = SeedError::from(err);
                    warn!(collection = %config.name, record = index, error = %err, "record rejected");
                    summary.failed_records += 1;
                    report.record_issue(
                        SeedIssue::new(Stage::Persist, Some(&config.name), &err).for_record(index),
                    );
                }
            }
        }

        created
    }

    async fn reuse_collection(
        &self,
        task: &CollectionTask,
        store: &dyn RecordStore,
        cache: &mut GenerationCache,
        report: &mut SeedReport,
    ) -> CollectionReport {
        let config = &task.config;
        let listed = bounded(
            self.options.call_timeout,
            store.get_full_list(&config.name),
            CoreError::Persistence,
        )
        .await;

        match listed {
            Ok(records) => {
                if records.is_empty() {
                    warn!(collection = %config.name, "store has no records to reuse");
                }
                let mut summary = empty_summary(config, CollectionStatus::Reused);
                summary.created = records.len();
                cache.extend(&config.name, records);
                summary
            }
            Err(err) => {
                let err = SeedError::from(err);
                warn!(collection = %config.name, error = %err, "listing existing records failed");
                report.record_issue(SeedIssue::new(Stage::Reuse, Some(&config.name), &err));
                cache.extend(&config.name, Vec::new());
                empty_summary(config, CollectionStatus::Failed)
            }
        }
    }
}

/// First dependency of `config` with nothing in the cache, as a pool error.
fn missing_dependency(config: &CollectionConfig, cache: &GenerationCache) -> Option<SeedError> {
    config.foreign_key_fields().find_map(|field| {
        let related = field.related_collection()?;
        if cache.has_records(related) {
            return None;
        }
        Some(SeedError::EmptyForeignKeyPool {
            collection: config.name.clone(),
            field: field.name.clone(),
            related: related.to_string(),
        })
    })
}

fn empty_summary(config: &CollectionConfig, status: CollectionStatus) -> CollectionReport {
    CollectionReport {
        collection: config.name.clone(),
        status,
        requested: config.sample_size,
        generated: 0,
        created: 0,
        failed_records: 0,
        duration_ms: 0,
    }
}

/// Await `future`, turning an elapsed deadline into the call's own failure kind.
async fn bounded<T, F>(
    limit: Duration,
    future: F,
    on_timeout: fn(String) -> CoreError,
) -> Result<T, CoreError>
where
    F: Future<Output = seedloom_core::Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(format!(
            "timed out after {} ms",
            limit.as_millis()
        ))),
    }
}

fn finish(mut report: SeedReport, cache: GenerationCache, start: Instant) -> SeedOutcome {
    report.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        event = "run_finished",
        run_id = %report.run_id,
        success = report.success,
        created = report.created_total(),
        issues = report.issues.len(),
        duration_ms = report.duration_ms
    );
    SeedOutcome {
        report,
        cache: cache.into_inner(),
    }
}
