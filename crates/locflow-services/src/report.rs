use crate::bucket::build_pipeline;
use crate::plan::Task;
use locflow_core::Result;
use locflow_delta::{compute_delta, LockFile};
use locflow_domain::{DeltaReport, SCHEMA_VERSION};
use locflow_pipeline::value::string_entries;
use serde_json::Value;
use std::path::Path;

/// Classify source changes per path identity without translating.
/// Duplicate patterns across locale pairs are reported once; the delta
/// depends only on source content and fingerprints.
pub fn inspect_delta(root: &Path, lock_path: &Path, tasks: &[Task]) -> Result<Vec<DeltaReport>> {
    let lock = LockFile::load(lock_path)?;
    let mut seen = std::collections::HashSet::new();
    let mut reports = Vec::new();
    for task in tasks {
        if !seen.insert(task.path_pattern.clone()) {
            continue;
        }
        let mut pipeline = build_pipeline(root, task)?;
        pipeline.init()?;
        pipeline.set_default_locale(&task.source_locale)?;
        let source = pipeline.pull(&task.source_locale, Value::Null)?;
        let source_entries = string_entries(&source);
        let delta = compute_delta(&source_entries, &lock.record(&task.path_pattern));
        let changed = delta.added.len() + delta.updated.len() + delta.renamed.len();
        reports.push(DeltaReport {
            schema_version: SCHEMA_VERSION,
            path_pattern: task.path_pattern.clone(),
            unchanged: source_entries.len() - delta.added.len() - delta.updated.len(),
            added: delta.added,
            updated: delta.updated,
            renamed: delta.renamed,
        });
        tracing::debug!(event = "delta_inspected", pattern = %reports.last().unwrap().path_pattern, changed);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketFormat;
    use crate::plan::Task;
    use locflow_core::TaskId;
    use tempfile::tempdir;

    fn task(pattern: &str, target: &str) -> Task {
        Task {
            id: TaskId(format!("json:{pattern}:en->{target}")),
            format: BucketFormat::Json,
            path_pattern: pattern.to_string(),
            delimiter: None,
            source_locale: "en".into(),
            target_locale: target.into(),
            inject_locale: vec![],
            locked_keys: vec![],
            locked_patterns: vec![],
            ignored_keys: vec![],
            only_keys: vec![],
        }
    }

    #[test]
    fn reports_once_per_pattern() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("locales")).unwrap();
        std::fs::write(
            dir.path().join("locales/en.json"),
            r#"{"a": "Hello", "b": "Bye"}"#,
        )
        .unwrap();

        let tasks = vec![
            task("locales/[locale].json", "de"),
            task("locales/[locale].json", "fr"),
        ];
        let reports =
            inspect_delta(dir.path(), &dir.path().join("locflow.lock"), &tasks).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].added, vec!["a", "b"]);
        assert_eq!(reports[0].unchanged, 0);
    }
}
