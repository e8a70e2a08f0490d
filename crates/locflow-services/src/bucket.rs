use crate::plan::Task;
use color_eyre::eyre::eyre;
use locflow_core::Result;
use locflow_format_json::JsonFormat;
use locflow_format_xml::XmlResourceFormat;
use locflow_pipeline::stages::{
    FlattenStage, InjectLocaleStage, LockedKeysStage, RootKeyStage, SortByOriginalStage,
    TextFileStage, LOCALE_PLACEHOLDER,
};
use locflow_pipeline::{Pipeline, StageContext, Transform};
use serde_json::{Map, Value};
use std::path::Path;

/// Format adapters the planner knows how to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketFormat {
    Json,
    Xml,
    Text,
}

impl BucketFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "json" => Some(BucketFormat::Json),
            "xml" => Some(BucketFormat::Xml),
            "text" => Some(BucketFormat::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketFormat::Json => "json",
            BucketFormat::Xml => "xml",
            BucketFormat::Text => "text",
        }
    }
}

impl std::fmt::Display for BucketFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-file format: the entire file body is one translatable unit under
/// a single `content` key. Covers plain-text assets (release notes,
/// store descriptions) without a structured parser.
#[derive(Debug, Default)]
struct PlainTextFormat;

impl Transform for PlainTextFormat {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let text = input.as_str().unwrap_or_default();
        let mut map = Map::new();
        if !text.is_empty() {
            map.insert("content".to_string(), Value::String(text.to_string()));
        }
        Ok(Value::Object(map))
    }

    fn push(&mut self, _locale: &str, data: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let text = data
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(Value::String(text.to_string()))
    }
}

fn format_transform(format: BucketFormat) -> Box<dyn Transform> {
    match format {
        BucketFormat::Json => Box::new(JsonFormat::new()),
        BucketFormat::Xml => Box::new(XmlResourceFormat::new()),
        BucketFormat::Text => Box::new(PlainTextFormat),
    }
}

/// Assemble the stage stack for one task. The file stage sits outermost,
/// then the format parser; the cross-cutting stages operate on the flat
/// key map and are shared by every format.
pub fn build_pipeline(root: &Path, task: &Task) -> Result<Pipeline> {
    if task.path_pattern.trim().is_empty() {
        return Err(eyre!("task {} has an empty path pattern", task.id));
    }
    let mut transforms: Vec<Box<dyn Transform>> = vec![
        Box::new(
            TextFileStage::new(root, task.path_pattern.clone()).with_delimiter(task.delimiter),
        ),
        format_transform(task.format),
    ];
    // Without a locale placeholder, every locale lives in one file under a
    // top-level locale key.
    if !task.path_pattern.contains(LOCALE_PLACEHOLDER) {
        transforms.push(Box::new(RootKeyStage::new()));
    }
    transforms.push(Box::new(FlattenStage::new()));
    transforms.push(Box::new(SortByOriginalStage::new()));
    transforms.push(Box::new(LockedKeysStage::new(
        task.locked_keys.clone(),
        task.locked_patterns.clone(),
        task.ignored_keys.clone(),
    )));
    transforms.push(Box::new(InjectLocaleStage::new(task.inject_locale.clone())));
    Ok(Pipeline::compose(transforms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use locflow_core::TaskId;
    use serde_json::json;
    use tempfile::tempdir;

    fn task(pattern: &str, format: BucketFormat) -> Task {
        Task {
            id: TaskId(format!("{format}:{pattern}:en->de")),
            format,
            path_pattern: pattern.to_string(),
            delimiter: None,
            source_locale: "en".into(),
            target_locale: "de".into(),
            inject_locale: vec!["language".into()],
            locked_keys: vec!["version".into()],
            locked_patterns: vec![],
            ignored_keys: vec![],
            only_keys: vec![],
        }
    }

    #[test]
    fn full_stack_pull_strips_and_push_restores() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("locales")).unwrap();
        std::fs::write(
            dir.path().join("locales/en.json"),
            r#"{"language": "en", "title": "Hello", "version": "1.0"}"#,
        )
        .unwrap();

        let task = task("locales/[locale].json", BucketFormat::Json);
        let mut pipeline = build_pipeline(dir.path(), &task).unwrap();
        pipeline.init().unwrap();
        pipeline.set_default_locale("en").unwrap();

        let source = pipeline.pull("en", Value::Null).unwrap();
        assert_eq!(source, json!({"title": "Hello"}));

        pipeline.pull("de", Value::Null).unwrap();
        pipeline.push("de", json!({"title": "Hallo"})).unwrap();

        let written = std::fs::read_to_string(dir.path().join("locales/de.json")).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        // Locked + injected content restored around the translation,
        // ordered like the source file.
        assert_eq!(
            value,
            json!({"language": "de", "title": "Hallo", "version": "1.0"})
        );
        let keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["language", "title", "version"]);
    }

    #[test]
    fn text_format_round_trips_whole_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes-en.txt"), "Release notes.").unwrap();

        let task = task("notes-[locale].txt", BucketFormat::Text);
        let mut pipeline = build_pipeline(dir.path(), &task).unwrap();
        pipeline.init().unwrap();
        pipeline.set_default_locale("en").unwrap();

        let source = pipeline.pull("en", Value::Null).unwrap();
        assert_eq!(source, json!({"content": "Release notes."}));

        pipeline.pull("de", Value::Null).unwrap();
        pipeline
            .push("de", json!({"content": "Versionshinweise."}))
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes-de.txt")).unwrap(),
            "Versionshinweise."
        );
    }
}
