use crate::stage::{StageContext, Transform};
use locflow_core::Result;
use serde_json::Value;

/// Handles synthetic locale fields (keys whose value is the locale code
/// itself, like `"language": "en"`). Pull removes them so they are never
/// translated; push re-inserts them carrying the pushed locale.
pub struct InjectLocaleStage {
    keys: Vec<String>,
}

impl InjectLocaleStage {
    pub fn new(keys: Vec<String>) -> Self {
        InjectLocaleStage { keys }
    }
}

impl Transform for InjectLocaleStage {
    fn name(&self) -> &'static str {
        "inject-locale"
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let Value::Object(mut map) = input else {
            return Ok(input);
        };
        for key in &self.keys {
            map.shift_remove(key);
        }
        Ok(Value::Object(map))
    }

    fn push(&mut self, locale: &str, data: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let Value::Object(mut map) = data else {
            return Ok(data);
        };
        for key in &self.keys {
            map.insert(key.clone(), Value::String(locale.to_string()));
        }
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    #[test]
    fn pull_removes_push_reinjects_with_target_locale() {
        let mut stage = Stage::new(Box::new(InjectLocaleStage::new(vec!["language".into()])));
        stage.set_default_locale("en").unwrap();

        let pulled = stage
            .pull("en", json!({"language": "en", "title": "Hi"}))
            .unwrap();
        assert_eq!(pulled, json!({"title": "Hi"}));

        let pushed = stage.push("de", json!({"title": "Hallo"})).unwrap();
        assert_eq!(pushed, json!({"title": "Hallo", "language": "de"}));
    }
}
