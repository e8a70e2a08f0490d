use crate::stage::{StageContext, Transform};
use locflow_core::Result;
use serde_json::{Map, Value};

/// Identity on pull; on push, reorders the flat map so keys follow the
/// default locale's order. Keys unknown to the source (e.g. target-only
/// leftovers) keep their relative order at the end.
#[derive(Debug, Default)]
pub struct SortByOriginalStage;

impl SortByOriginalStage {
    pub fn new() -> Self {
        SortByOriginalStage
    }
}

impl Transform for SortByOriginalStage {
    fn name(&self) -> &'static str {
        "sort-by-original"
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        Ok(input)
    }

    fn push(&mut self, _locale: &str, data: Value, ctx: StageContext<'_>) -> Result<Value> {
        let Value::Object(mut map) = data else {
            return Ok(data);
        };
        let Some(Value::Object(original)) = ctx.original_input else {
            return Ok(Value::Object(map));
        };
        let mut ordered = Map::new();
        for key in original.keys() {
            if let Some(value) = map.shift_remove(key) {
                ordered.insert(key.clone(), value);
            }
        }
        for (key, value) in map {
            ordered.insert(key, value);
        }
        Ok(Value::Object(ordered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    #[test]
    fn push_matches_source_order() {
        let mut stage = Stage::new(Box::new(SortByOriginalStage::new()));
        stage.set_default_locale("en").unwrap();
        stage
            .pull("en", json!({"a": "1", "b": "2", "c": "3"}))
            .unwrap();

        let pushed = stage
            .push("de", json!({"c": "drei", "extra": "x", "a": "eins", "b": "zwei"}))
            .unwrap();
        let keys: Vec<String> = pushed.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c", "extra"]);
    }
}
