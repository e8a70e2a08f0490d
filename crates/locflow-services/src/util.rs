use locflow_core::Result;
use regex::Regex;
use std::path::Path;

/// Path relative to `root`, `/`-separated regardless of platform.
pub(crate) fn relative_unix_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}

/// Compile `*`-wildcard globs into anchored regexes.
pub(crate) fn compile_globs(globs: &[String]) -> Result<Vec<Regex>> {
    globs
        .iter()
        .map(|glob| {
            let escaped = regex::escape(glob).replace(r"\*", ".*");
            Ok(Regex::new(&format!("^{escaped}$"))?)
        })
        .collect()
}

pub(crate) fn matches_any(matchers: &[Regex], key: &str) -> bool {
    matchers.iter().any(|re| re.is_match(key))
}
