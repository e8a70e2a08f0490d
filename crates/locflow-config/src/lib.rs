use locflow_core::LocaleDelimiter;
use serde::Deserialize;
use std::path::Path;

/// Project configuration as read from `locflow.toml`.
/// Every field is optional at the file level; validation and defaulting
/// happen at plan time, not load time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocFlowConfig {
    pub source_locale: Option<String>,
    pub target_locales: Option<Vec<String>>,
    /// Concurrent backend calls in flight (bounded by a hard cap).
    pub concurrency: Option<usize>,
    /// Lock file path, relative to the project root.
    pub lock_file: Option<String>,
    #[serde(default)]
    pub buckets: Vec<BucketCfg>,
}

/// A group of files sharing a format and a set of path patterns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketCfg {
    /// Format adapter name: "json", "xml" or "text".
    pub format: Option<String>,
    #[serde(default)]
    pub include: Vec<PathPatternCfg>,
    #[serde(default)]
    pub locked_keys: Vec<String>,
    #[serde(default)]
    pub locked_patterns: Vec<String>,
    #[serde(default)]
    pub ignored_keys: Vec<String>,
    #[serde(default)]
    pub inject_locale: Vec<String>,
}

/// A path pattern, either bare or with a per-path locale-code delimiter
/// override (`fr-CA` vs `fr_CA` vs `frCA` in the substituted path).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PathPatternCfg {
    Plain(String),
    Detailed {
        path: String,
        delimiter: Option<LocaleDelimiter>,
    },
}

impl PathPatternCfg {
    pub fn path(&self) -> &str {
        match self {
            PathPatternCfg::Plain(p) => p,
            PathPatternCfg::Detailed { path, .. } => path,
        }
    }

    pub fn delimiter(&self) -> Option<LocaleDelimiter> {
        match self {
            PathPatternCfg::Plain(_) => None,
            PathPatternCfg::Detailed { delimiter, .. } => *delimiter,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

pub const CONFIG_FILE_NAME: &str = "locflow.toml";

/// Load configuration, merging `CWD/locflow.toml` over
/// `$CONFIG_DIR/locflow/locflow.toml`. Missing files contribute nothing;
/// malformed files are an error.
pub fn load_config() -> Result<LocFlowConfig, ConfigError> {
    let mut merged = LocFlowConfig::default();
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(cfg) = load_file(&cwd.join(CONFIG_FILE_NAME))? {
            merged = merge(merged, cfg);
        }
    }
    if let Some(base) = dirs::config_dir() {
        if let Some(cfg) = load_file(&base.join("locflow").join(CONFIG_FILE_NAME))? {
            merged = merge(merged, cfg);
        }
    }
    Ok(merged)
}

/// Load a single config file; `None` when the file does not exist.
pub fn load_file(path: &Path) -> Result<Option<LocFlowConfig>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            })
        }
    };
    let cfg = toml::from_str::<LocFlowConfig>(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(cfg))
}

fn merge(mut a: LocFlowConfig, b: LocFlowConfig) -> LocFlowConfig {
    if a.source_locale.is_none() {
        a.source_locale = b.source_locale;
    }
    if a.target_locales.is_none() {
        a.target_locales = b.target_locales;
    }
    if a.concurrency.is_none() {
        a.concurrency = b.concurrency;
    }
    if a.lock_file.is_none() {
        a.lock_file = b.lock_file;
    }
    if a.buckets.is_empty() {
        a.buckets = b.buckets;
    }
    a
}

/// Starter config written by `locflow init`.
pub const STARTER_CONFIG: &str = r#"source_locale = "en"
target_locales = ["de", "fr"]

[[buckets]]
format = "json"
include = ["locales/[locale].json"]
# locked_keys = ["version"]
# locked_patterns = ["meta/*"]
# ignored_keys = ["internal/debug"]
# inject_locale = ["language"]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_file(&dir.path().join("locflow.toml")).unwrap().is_none());
    }

    #[test]
    fn parses_buckets_and_pattern_variants() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locflow.toml");
        fs::write(
            &path,
            r#"
source_locale = "en"
target_locales = ["de", "fr-CA"]
concurrency = 4

[[buckets]]
format = "json"
include = [
    "locales/[locale].json",
    { path = "app/[locale]/strings.json", delimiter = "underscore" },
]
locked_keys = ["version"]
inject_locale = ["language"]
"#,
        )
        .unwrap();

        let cfg = load_file(&path).unwrap().unwrap();
        assert_eq!(cfg.source_locale.as_deref(), Some("en"));
        assert_eq!(cfg.concurrency, Some(4));
        assert_eq!(cfg.buckets.len(), 1);
        let bucket = &cfg.buckets[0];
        assert_eq!(bucket.format.as_deref(), Some("json"));
        assert_eq!(bucket.include.len(), 2);
        assert_eq!(bucket.include[0].path(), "locales/[locale].json");
        assert!(bucket.include[0].delimiter().is_none());
        assert_eq!(
            bucket.include[1].delimiter(),
            Some(LocaleDelimiter::Underscore)
        );
        assert_eq!(bucket.locked_keys, vec!["version"]);
        assert_eq!(bucket.inject_locale, vec!["language"]);
    }

    #[test]
    fn merge_prefers_first_source() {
        let a = LocFlowConfig {
            source_locale: Some("en".into()),
            ..Default::default()
        };
        let b = LocFlowConfig {
            source_locale: Some("ru".into()),
            target_locales: Some(vec!["de".into()]),
            ..Default::default()
        };
        let merged = merge(a, b);
        assert_eq!(merged.source_locale.as_deref(), Some("en"));
        assert_eq!(merged.target_locales, Some(vec!["de".to_string()]));
    }

    #[test]
    fn starter_config_parses() {
        let cfg: LocFlowConfig = toml::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(cfg.source_locale.as_deref(), Some("en"));
        assert_eq!(cfg.buckets.len(), 1);
    }
}
