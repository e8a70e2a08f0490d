use crate::bucket::BucketFormat;
use crate::util::relative_unix_path;
use locflow_core::{resolve_locale_code, LocaleDelimiter, TaskId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

/// One unit of translation work: a single (format, path pattern,
/// source → target) triple plus the key filters that apply to it.
/// Immutable after planning; consumed exactly once by the engine.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub format: BucketFormat,
    /// Path pattern relative to the project root, still carrying the
    /// `[locale]` placeholder. Doubles as the fingerprint path identity.
    pub path_pattern: String,
    pub delimiter: Option<LocaleDelimiter>,
    pub source_locale: String,
    pub target_locale: String,
    pub inject_locale: Vec<String>,
    pub locked_keys: Vec<String>,
    pub locked_patterns: Vec<String>,
    pub ignored_keys: Vec<String>,
    pub only_keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Keep only buckets of this format.
    pub bucket_filter: Option<String>,
    /// Keep only path patterns containing this substring.
    pub file_filter: Option<String>,
    /// Glob filters for translatable keys, attached to every task.
    pub key_filter: Vec<String>,
    /// Restrict target locales; empty means all configured targets.
    pub locale_filter: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no source locale configured")]
    MissingSourceLocale,
    #[error("no target locales configured")]
    MissingTargetLocales,
    #[error("bucket has no format configured")]
    MissingFormat,
    #[error("unknown bucket format `{0}`")]
    UnknownFormat(String),
    #[error("`{0}` is not one of the configured target locales")]
    UnknownTargetLocale(String),
}

/// Expand configuration into the flat task list.
///
/// Filters narrow the bucket/pattern set before any filesystem expansion,
/// keeping the task count proportional to the work actually requested.
/// A (source == target) pair never produces a task.
pub fn plan(
    root: &Path,
    config: &locflow_config::LocFlowConfig,
    opts: &PlanOptions,
) -> Result<Vec<Task>, PlanError> {
    let source_locale = config
        .source_locale
        .as_deref()
        .ok_or(PlanError::MissingSourceLocale)?;
    let all_targets = config
        .target_locales
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(PlanError::MissingTargetLocales)?;

    for locale in &opts.locale_filter {
        if !all_targets.contains(locale) {
            return Err(PlanError::UnknownTargetLocale(locale.clone()));
        }
    }
    let targets: Vec<&String> = if opts.locale_filter.is_empty() {
        all_targets.iter().collect()
    } else {
        all_targets
            .iter()
            .filter(|t| opts.locale_filter.contains(t))
            .collect()
    };

    let mut tasks = Vec::new();
    for bucket in &config.buckets {
        let format_name = bucket.format.as_deref().ok_or(PlanError::MissingFormat)?;
        let format = BucketFormat::parse(format_name)
            .ok_or_else(|| PlanError::UnknownFormat(format_name.to_string()))?;
        if let Some(filter) = opts.bucket_filter.as_deref() {
            if format.as_str() != filter {
                continue;
            }
        }
        for include in &bucket.include {
            let raw_pattern = include.path();
            if let Some(filter) = opts.file_filter.as_deref() {
                if !raw_pattern.contains(filter) {
                    continue;
                }
            }
            let delimiter = include.delimiter();
            let source_code = resolve_locale_code(source_locale, delimiter);
            for pattern in expand_pattern(root, raw_pattern, &source_code) {
                for target in &targets {
                    if target.as_str() == source_locale {
                        continue;
                    }
                    tasks.push(Task {
                        id: TaskId(format!("{format}:{pattern}:{source_locale}->{target}")),
                        format,
                        path_pattern: pattern.clone(),
                        delimiter,
                        source_locale: source_locale.to_string(),
                        target_locale: (*target).clone(),
                        inject_locale: bucket.inject_locale.clone(),
                        locked_keys: bucket.locked_keys.clone(),
                        locked_patterns: bucket.locked_patterns.clone(),
                        ignored_keys: bucket.ignored_keys.clone(),
                        only_keys: opts.key_filter.clone(),
                    });
                }
            }
        }
    }
    tracing::debug!(event = "plan_expanded", tasks = tasks.len());
    Ok(tasks)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Star,
    Locale,
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*|\[locale\]").expect("valid regex"));

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in TOKEN_RE.find_iter(pattern) {
        if m.start() > last {
            tokens.push(Token::Literal(pattern[last..m.start()].to_string()));
        }
        tokens.push(match m.as_str() {
            "*" => Token::Star,
            _ => Token::Locale,
        });
        last = m.end();
    }
    if last < pattern.len() {
        tokens.push(Token::Literal(pattern[last..].to_string()));
    }
    tokens
}

/// Expand a pattern's `*` wildcards against the files that exist for the
/// source locale, yielding concrete patterns that still carry `[locale]`.
/// Patterns without wildcards pass through untouched, whether or not the
/// file exists yet.
fn expand_pattern(root: &Path, pattern: &str, source_code: &str) -> Vec<String> {
    let tokens = tokenize(pattern);
    if !tokens.contains(&Token::Star) {
        return vec![pattern.to_string()];
    }

    let mut regex = String::from("^");
    for token in &tokens {
        match token {
            Token::Literal(text) => regex.push_str(&regex::escape(text)),
            Token::Star => regex.push_str("([^/]*)"),
            Token::Locale => regex.push_str(&regex::escape(source_code)),
        }
    }
    regex.push('$');
    let Ok(matcher) = Regex::new(&regex) else {
        return Vec::new();
    };

    let mut patterns = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        let Some(relative) = relative_unix_path(root, entry.path()) else {
            continue;
        };
        let Some(captures) = matcher.captures(&relative) else {
            continue;
        };
        let mut rebuilt = String::new();
        let mut capture_index = 1;
        for token in &tokens {
            match token {
                Token::Literal(text) => rebuilt.push_str(text),
                Token::Locale => rebuilt.push_str("[locale]"),
                Token::Star => {
                    rebuilt.push_str(captures.get(capture_index).map_or("", |m| m.as_str()));
                    capture_index += 1;
                }
            }
        }
        if !patterns.contains(&rebuilt) {
            patterns.push(rebuilt);
        }
    }
    patterns.sort();
    patterns
}
