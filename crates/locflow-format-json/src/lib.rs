//! JSON format adapter.
//!
//! Pull parses the raw text into an ordered object; push serializes back
//! with stable two-space indentation and a trailing newline. Keys starting
//! with `@` are translator metadata: they are stripped on pull, surfaced
//! through hint extraction as context for their sibling key, and restored
//! on push from the original input.

use color_eyre::eyre::eyre;
use locflow_core::Result;
use locflow_pipeline::{StageContext, Transform};
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub struct JsonFormat;

impl JsonFormat {
    pub fn new() -> Self {
        JsonFormat
    }

    fn parse(text: &str) -> Result<Value> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        let value: Value = serde_json::from_str(trimmed)?;
        match value {
            Value::Object(_) | Value::Array(_) => Ok(value),
            other => Err(eyre!("expected a JSON object or array, got {other}")),
        }
    }

    fn strip_metadata(value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(key, _)| !key.starts_with('@'))
                    .map(|(key, child)| (key, Self::strip_metadata(child)))
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(Self::strip_metadata).collect())
            }
            other => other,
        }
    }

    fn restore_metadata(data: Value, original: &Value) -> Value {
        let (Value::Object(data_map), Value::Object(original_map)) = (&data, original) else {
            return data;
        };
        let mut out = Map::new();
        for (key, original_child) in original_map {
            if key.starts_with('@') && !data_map.contains_key(key) {
                out.insert(key.clone(), original_child.clone());
            } else if let Some(value) = data_map.get(key) {
                out.insert(
                    key.clone(),
                    Self::restore_metadata(value.clone(), original_child),
                );
            }
        }
        for (key, value) in data_map {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    fn collect_hints(value: &Value, prefix: &str, out: &mut Map<String, Value>) {
        let Value::Object(map) = value else {
            return;
        };
        for (key, child) in map {
            if let Some(target) = key.strip_prefix('@') {
                if let Value::String(hint) = child {
                    let path = if prefix.is_empty() {
                        target.to_string()
                    } else {
                        format!("{prefix}/{target}")
                    };
                    out.insert(path, Value::String(hint.clone()));
                }
            } else {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}/{key}")
                };
                Self::collect_hints(child, &path, out);
            }
        }
    }
}

impl Transform for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let text = input.as_str().unwrap_or_default();
        Ok(Self::strip_metadata(Self::parse(text)?))
    }

    fn push(&mut self, _locale: &str, data: Value, ctx: StageContext<'_>) -> Result<Value> {
        let restored = match ctx.original_input.and_then(|v| v.as_str()) {
            Some(original_text) => {
                let original = Self::parse(original_text)?;
                Self::restore_metadata(data, &original)
            }
            None => data,
        };
        let mut text = serde_json::to_string_pretty(&restored)?;
        text.push('\n');
        Ok(Value::String(text))
    }

    fn pull_hints(&mut self, original_input: &Value) -> Result<Option<Value>> {
        let text = original_input.as_str().unwrap_or_default();
        let parsed = Self::parse(text)?;
        let mut hints = Map::new();
        Self::collect_hints(&parsed, "", &mut hints);
        if hints.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Value::Object(hints)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locflow_pipeline::Stage;
    use serde_json::json;

    fn stage() -> Stage {
        let mut stage = Stage::new(Box::new(JsonFormat::new()));
        stage.set_default_locale("en").unwrap();
        stage
    }

    #[test]
    fn empty_input_parses_as_empty_object() {
        let mut s = stage();
        assert_eq!(s.pull("en", json!("")).unwrap(), json!({}));
    }

    #[test]
    fn round_trip_preserves_key_order() {
        let mut s = stage();
        let text = "{\n  \"z\": \"last\",\n  \"a\": \"first\"\n}\n";
        let pulled = s.pull("en", json!(text)).unwrap();
        let pushed = s.push("en", pulled).unwrap();
        assert_eq!(pushed, json!(text));
    }

    #[test]
    fn scalar_root_is_rejected() {
        let mut s = stage();
        assert!(s.pull("en", json!("42")).is_err());
    }

    #[test]
    fn metadata_keys_become_hints_and_survive_push() {
        let mut s = stage();
        let text = r#"{
  "title": "Hello",
  "@title": "Shown in the window bar",
  "menu": {
    "open": "Open",
    "@open": "Verb, not adjective"
  }
}"#;
        let pulled = s.pull("en", json!(text)).unwrap();
        assert_eq!(
            pulled,
            json!({"title": "Hello", "menu": {"open": "Open"}})
        );

        let hints = s.pull_hints().unwrap().unwrap();
        assert_eq!(
            hints,
            json!({"title": "Shown in the window bar", "menu/open": "Verb, not adjective"})
        );

        let pushed = s.push("en", pulled).unwrap();
        let reparsed: Value = serde_json::from_str(pushed.as_str().unwrap()).unwrap();
        assert_eq!(reparsed["@title"], json!("Shown in the window bar"));
        assert_eq!(reparsed["menu"]["@open"], json!("Verb, not adjective"));
    }
}
