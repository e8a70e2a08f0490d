use crate::stage::{StageContext, Transform};
use locflow_core::{resolve_locale_code, LocaleDelimiter, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Placeholder substituted with the (delimiter-resolved) locale code when
/// a path pattern is bound to a concrete locale.
pub const LOCALE_PLACEHOLDER: &str = "[locale]";

/// Outermost stage: binds a path pattern to the filesystem. Pull reads the
/// locale's file (missing file reads as empty input, so new target locales
/// start from nothing); push writes the serialized payload, creating
/// parent directories as needed.
pub struct TextFileStage {
    root: PathBuf,
    pattern: String,
    delimiter: Option<LocaleDelimiter>,
}

impl TextFileStage {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        TextFileStage {
            root: root.into(),
            pattern: pattern.into(),
            delimiter: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<LocaleDelimiter>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path_for(&self, locale: &str) -> PathBuf {
        let code = resolve_locale_code(locale, self.delimiter);
        self.root
            .join(self.pattern.replace(LOCALE_PLACEHOLDER, &code))
    }
}

impl Transform for TextFileStage {
    fn name(&self) -> &'static str {
        "text-file"
    }

    fn pull(&mut self, locale: &str, _input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let path = self.path_for(locale);
        let text = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(color_eyre_read(&path, e));
            }
        };
        tracing::debug!(event = "file_pulled", path = %path.display(), bytes = text.len());
        Ok(Value::String(text))
    }

    fn push(&mut self, locale: &str, data: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let path = self.path_for(locale);
        let text = match &data {
            Value::String(s) => s.as_str(),
            _ => "",
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        tracing::debug!(event = "file_pushed", path = %path.display(), bytes = text.len());
        Ok(Value::Null)
    }
}

fn color_eyre_read(path: &std::path::Path, e: std::io::Error) -> color_eyre::eyre::Report {
    color_eyre::eyre::eyre!("failed to read {}: {e}", path.display())
}
