use serde::{Deserialize, Serialize};

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Identity of one translation task: one (format, path pattern, locale pair)
/// unit of work. Stable across a run; used to key task results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locale-code delimiter used when substituting a locale into a path
/// pattern. Some trees want `fr-CA`, others `fr_CA` or `frca`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleDelimiter {
    Dash,
    Underscore,
    None,
}

/// Rewrite a locale code to use the given delimiter between its segments.
/// Codes without a region segment pass through unchanged.
pub fn resolve_locale_code(locale: &str, delimiter: Option<LocaleDelimiter>) -> String {
    let Some(delimiter) = delimiter else {
        return locale.to_string();
    };
    let parts: Vec<&str> = locale.split(['-', '_']).collect();
    match delimiter {
        LocaleDelimiter::Dash => parts.join("-"),
        LocaleDelimiter::Underscore => parts.join("_"),
        LocaleDelimiter::None => parts.concat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_code_passthrough_without_delimiter() {
        assert_eq!(resolve_locale_code("fr-CA", None), "fr-CA");
        assert_eq!(resolve_locale_code("en", None), "en");
    }

    #[test]
    fn locale_code_rewrites_delimiter() {
        assert_eq!(
            resolve_locale_code("fr-CA", Some(LocaleDelimiter::Underscore)),
            "fr_CA"
        );
        assert_eq!(
            resolve_locale_code("fr_CA", Some(LocaleDelimiter::Dash)),
            "fr-CA"
        );
        assert_eq!(
            resolve_locale_code("fr-CA", Some(LocaleDelimiter::None)),
            "frCA"
        );
    }

    #[test]
    fn locale_code_without_region_is_stable() {
        assert_eq!(
            resolve_locale_code("de", Some(LocaleDelimiter::Underscore)),
            "de"
        );
    }
}
