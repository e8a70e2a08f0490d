use crate::backend::{ProgressChunk, TranslateRequest, TranslationBackend};
use crate::bucket::build_pipeline;
use crate::plan::Task;
use crate::util::{compile_globs, matches_any};
use indexmap::IndexMap;
use locflow_core::Result;
use locflow_delta::{compute_delta, fingerprint_source, Delta, LockFile};
use locflow_domain::{RunSummary, TaskReport, TaskStatus, SCHEMA_VERSION};
use locflow_pipeline::value::string_entries;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Upper bound on logical workers, regardless of requested concurrency.
pub const MAX_WORKERS: usize = 10;
pub const DEFAULT_BACKEND_CONCURRENCY: usize = 10;
/// Hard cap on concurrent backend calls, above any user setting.
pub const MAX_BACKEND_CONCURRENCY: usize = 20;

pub struct ExecuteOptions {
    pub root: PathBuf,
    pub lock_path: PathBuf,
    /// Requested concurrency; bounds both workers and backend calls.
    pub concurrency: usize,
    /// Translate every key, not just the delta.
    pub force: bool,
    /// False for partial `--locale` runs, which must not overwrite
    /// fingerprints covering locales they did not touch.
    pub persist_fingerprints: bool,
    /// Set by an interrupt handler: finish the task in flight, skip the
    /// rest. In-progress writes always complete.
    pub cancel: Arc<AtomicBool>,
}

impl ExecuteOptions {
    pub fn new(root: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Self {
        ExecuteOptions {
            root: root.into(),
            lock_path: lock_path.into(),
            concurrency: DEFAULT_BACKEND_CONCURRENCY,
            force: false,
            persist_fingerprints: true,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Run every task to completion and aggregate per-task outcomes.
///
/// Tasks are statically sharded round-robin across workers; each worker
/// walks its shard sequentially while workers run concurrently. One
/// semaphore bounds backend calls in flight; a single-permit semaphore
/// serializes every read-modify-write against the filesystem, because
/// several tasks may target the same physical file. A task failure is
/// recorded and never aborts its siblings.
pub async fn execute<B: TranslationBackend>(
    tasks: &[Task],
    backend: &B,
    opts: &ExecuteOptions,
) -> RunSummary {
    if tasks.is_empty() {
        return RunSummary::from_reports(Vec::new());
    }
    let worker_count = opts.concurrency.min(tasks.len()).min(MAX_WORKERS).max(1);
    let backend_sem = Semaphore::new(opts.concurrency.clamp(1, MAX_BACKEND_CONCURRENCY));
    let io_sem = Semaphore::new(1);
    tracing::info!(
        event = "run_started",
        tasks = tasks.len(),
        workers = worker_count,
        backend = backend.name()
    );

    let workers = (0..worker_count).map(|worker| {
        let backend_sem = &backend_sem;
        let io_sem = &io_sem;
        async move {
            let mut reports = Vec::new();
            for (index, task) in tasks
                .iter()
                .enumerate()
                .skip(worker)
                .step_by(worker_count)
            {
                if opts.cancel.load(Ordering::SeqCst) {
                    tracing::warn!(event = "task_unscheduled", task = %task.id);
                    continue;
                }
                let report = run_task(task, backend, opts, backend_sem, io_sem).await;
                reports.push((index, report));
            }
            reports
        }
    });

    let mut indexed: Vec<(usize, TaskReport)> = futures::future::join_all(workers)
        .await
        .into_iter()
        .flatten()
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    let summary = RunSummary::from_reports(indexed.into_iter().map(|(_, r)| r).collect());
    tracing::info!(
        event = "run_finished",
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped
    );
    summary
}

/// Catch everything a task can throw and turn it into its report; errors
/// are terminal for the task only.
async fn run_task<B: TranslationBackend>(
    task: &Task,
    backend: &B,
    opts: &ExecuteOptions,
    backend_sem: &Semaphore,
    io_sem: &Semaphore,
) -> TaskReport {
    let (status, error, translated_keys) =
        match run_task_inner(task, backend, opts, backend_sem, io_sem).await {
            Ok((status, translated_keys)) => (status, None, translated_keys),
            Err(e) => {
                let message = format!("{e:#}");
                tracing::error!(event = "task_failed", task = %task.id, error = %message);
                (TaskStatus::Error, Some(message), 0)
            }
        };
    TaskReport {
        schema_version: SCHEMA_VERSION,
        format: task.format.to_string(),
        path_pattern: task.path_pattern.clone(),
        source_locale: task.source_locale.clone(),
        target_locale: task.target_locale.clone(),
        status,
        error,
        translated_keys,
    }
}

async fn run_task_inner<B: TranslationBackend>(
    task: &Task,
    backend: &B,
    opts: &ExecuteOptions,
    backend_sem: &Semaphore,
    io_sem: &Semaphore,
) -> Result<(TaskStatus, usize)> {
    let mut pipeline = build_pipeline(&opts.root, task)?;
    pipeline.init()?;
    pipeline.set_default_locale(&task.source_locale)?;

    tracing::debug!(event = "task_pulling", task = %task.id);
    let (source_flat, target_flat) = {
        let _permit = io_sem.acquire().await?;
        let source = pipeline.pull(&task.source_locale, Value::Null)?;
        let target = pipeline.pull(&task.target_locale, Value::Null)?;
        (source, target)
    };
    let source_entries = string_entries(&source_flat);
    let target_entries = string_entries(&target_flat);

    if source_entries.is_empty() {
        tracing::debug!(event = "task_empty_source", task = %task.id);
        return Ok((TaskStatus::Skipped, 0));
    }

    let fingerprints = {
        let _permit = io_sem.acquire().await?;
        LockFile::load(&opts.lock_path)?.record(&task.path_pattern)
    };
    let delta = compute_delta(&source_entries, &fingerprints);
    tracing::debug!(
        event = "delta_computed",
        task = %task.id,
        added = delta.added.len(),
        updated = delta.updated.len(),
        renamed = delta.renamed.len()
    );

    let only_matchers = compile_globs(&task.only_keys)?;
    let translatable = delta.translatable();
    let processable: IndexMap<String, String> = source_entries
        .iter()
        .filter(|(key, _)| opts.force || translatable.contains(key.as_str()))
        .filter(|(key, _)| task.only_keys.is_empty() || matches_any(&only_matchers, key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if processable.is_empty() && delta.renamed.is_empty() {
        // Nothing to translate; rewrite the target unchanged so
        // non-content changes (ordering, restored metadata) propagate.
        let _permit = io_sem.acquire().await?;
        pipeline.push(&task.target_locale, target_flat.clone())?;
        tracing::debug!(event = "task_skipped", task = %task.id);
        return Ok((TaskStatus::Skipped, 0));
    }

    let translated = if processable.is_empty() {
        // Pure renames: nothing for the backend, but the target content
        // still has to move to the new key names.
        IndexMap::new()
    } else {
        tracing::debug!(event = "task_translating", task = %task.id, keys = processable.len());
        let request = TranslateRequest {
            source_locale: task.source_locale.clone(),
            target_locale: task.target_locale.clone(),
            source_data: source_entries.clone(),
            target_data: target_entries.clone(),
            processable_data: processable.clone(),
        };
        let (tx, mut rx) = mpsc::channel::<ProgressChunk>(16);
        let translate = async {
            let _permit = backend_sem.acquire().await?;
            backend.translate(request, Some(tx)).await
        };
        // Single consumer: progress callbacks never touch the disk
        // themselves, they queue chunks that are applied here in order,
        // each one re-pulling to pick up sibling tasks' writes.
        let apply_chunks = async {
            while let Some(chunk) = rx.recv().await {
                let _permit = io_sem.acquire().await?;
                tracing::debug!(event = "progress_chunk", task = %task.id, percent = chunk.percent);
                pipeline.pull(&task.source_locale, Value::Null)?;
                let target_now = pipeline.pull(&task.target_locale, Value::Null)?;
                let merged = merge_into_target(&target_now, &chunk.processed, &delta);
                pipeline.push(&task.target_locale, merged)?;
            }
            Ok::<(), color_eyre::eyre::Report>(())
        };
        let (translated, applied) = tokio::join!(translate, apply_chunks);
        applied?;
        translated?
    };

    tracing::debug!(event = "task_pushing", task = %task.id);
    {
        let _permit = io_sem.acquire().await?;
        // Idempotent with the last progress write: same inputs, same file.
        let target_now = pipeline.pull(&task.target_locale, Value::Null)?;
        let merged = merge_into_target(&target_now, &translated, &delta);
        pipeline.push(&task.target_locale, merged)?;

        if opts.persist_fingerprints {
            let mut lock = LockFile::load(&opts.lock_path)?;
            lock.set_record(&task.path_pattern, fingerprint_source(&source_entries));
            lock.save(&opts.lock_path)?;
        }
    }
    tracing::debug!(event = "task_success", task = %task.id, translated = translated.len());
    Ok((TaskStatus::Success, translated.len()))
}

/// Overlay translated values on the latest target data and re-attach
/// renamed keys' existing translations to their new names. Keys only the
/// target knows are left alone; deletion is never inferred here.
fn merge_into_target(
    target_flat: &Value,
    processed: &IndexMap<String, String>,
    delta: &Delta,
) -> Value {
    let mut map = match target_flat {
        Value::Object(m) => m.clone(),
        _ => Map::new(),
    };
    for (key, value) in processed {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    for (old, new) in &delta.renamed {
        if let Some(value) = map.shift_remove(old) {
            map.entry(new.clone()).or_insert(value);
        }
    }
    Value::Object(map)
}
