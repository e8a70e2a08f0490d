use crate::stage::{StageContext, Transform};
use locflow_core::Result;
use regex::Regex;
use serde_json::{Map, Value};

/// Strips locked and ignored keys from the flat map on pull so they never
/// reach the translation backend; push restores them from the most recent
/// pull input (the target file's own values), falling back to the default
/// locale's original input for keys the target does not have yet.
///
/// Locked/ignored key entries match a flat key exactly or as a `/`-path
/// prefix; locked patterns are `*`-wildcard globs over the whole key.
pub struct LockedKeysStage {
    locked_keys: Vec<String>,
    ignored_keys: Vec<String>,
    locked_patterns: Vec<String>,
    matchers: Option<Vec<Regex>>,
}

impl LockedKeysStage {
    pub fn new(
        locked_keys: Vec<String>,
        locked_patterns: Vec<String>,
        ignored_keys: Vec<String>,
    ) -> Self {
        LockedKeysStage {
            locked_keys,
            ignored_keys,
            locked_patterns,
            matchers: None,
        }
    }

    fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
        patterns
            .iter()
            .map(|pattern| {
                let escaped = regex::escape(pattern).replace(r"\*", ".*");
                Ok(Regex::new(&format!("^{escaped}$"))?)
            })
            .collect()
    }

    fn is_stripped(&self, key: &str) -> bool {
        let by_path = |entries: &[String]| {
            entries
                .iter()
                .any(|entry| key == entry || key.starts_with(&format!("{entry}/")))
        };
        if by_path(&self.locked_keys) || by_path(&self.ignored_keys) {
            return true;
        }
        self.matchers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|re| re.is_match(key))
    }
}

impl Transform for LockedKeysStage {
    fn name(&self) -> &'static str {
        "locked-keys"
    }

    fn init(&mut self) -> Result<()> {
        if self.matchers.is_none() {
            self.matchers = Some(Self::compile(&self.locked_patterns)?);
        }
        Ok(())
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let Value::Object(map) = input else {
            return Ok(input);
        };
        let kept: Map<String, Value> = map
            .into_iter()
            .filter(|(key, _)| !self.is_stripped(key))
            .collect();
        Ok(Value::Object(kept))
    }

    fn push(&mut self, _locale: &str, data: Value, ctx: StageContext<'_>) -> Result<Value> {
        let mut out = match data {
            Value::Object(map) => map,
            other => return Ok(other),
        };
        let restore_from = |source: Option<&Value>, out: &mut Map<String, Value>| {
            if let Some(Value::Object(map)) = source {
                for (key, value) in map {
                    if self.is_stripped(key) && !out.contains_key(key) {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
        };
        restore_from(ctx.last_pull_input, &mut out);
        restore_from(ctx.original_input, &mut out);
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    fn stage(locked: &[&str], patterns: &[&str], ignored: &[&str]) -> Stage {
        let mut stage = Stage::new(Box::new(LockedKeysStage::new(
            locked.iter().map(|s| s.to_string()).collect(),
            patterns.iter().map(|s| s.to_string()).collect(),
            ignored.iter().map(|s| s.to_string()).collect(),
        )));
        stage.init().unwrap();
        stage.set_default_locale("en").unwrap();
        stage
    }

    #[test]
    fn pull_strips_locked_prefix_and_patterns() {
        let mut s = stage(&["version"], &["meta/*"], &["debug"]);
        let pulled = s
            .pull(
                "en",
                json!({
                    "title": "Hello",
                    "version": "1.0",
                    "version/build": "7",
                    "meta/author": "me",
                    "debug": "x"
                }),
            )
            .unwrap();
        assert_eq!(pulled, json!({"title": "Hello"}));
    }

    #[test]
    fn push_restores_from_target_then_source() {
        let mut s = stage(&["version"], &[], &[]);
        s.pull("en", json!({"title": "Hello", "version": "2.0"}))
            .unwrap();
        // Target already carries its own locked value.
        s.pull("de", json!({"title": "Hallo", "version": "1.9"}))
            .unwrap();
        let pushed = s.push("de", json!({"title": "Hallo!"})).unwrap();
        assert_eq!(pushed, json!({"title": "Hallo!", "version": "1.9"}));
    }

    #[test]
    fn push_falls_back_to_source_for_new_targets() {
        let mut s = stage(&["version"], &[], &[]);
        s.pull("en", json!({"title": "Hello", "version": "2.0"}))
            .unwrap();
        s.pull("de", json!({})).unwrap();
        let pushed = s.push("de", json!({"title": "Hallo"})).unwrap();
        assert_eq!(pushed, json!({"title": "Hallo", "version": "2.0"}));
    }
}
