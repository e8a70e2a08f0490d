use crate::stage::{StageContext, Transform};
use locflow_core::Result;
use serde_json::{Map, Value};

/// Selects the locale's subtree from a file that keeps every locale under
/// a top-level key (`{"en": {...}, "de": {...}}`). Push writes the locale
/// subtree back into the most recently pulled full document, leaving the
/// other locales' subtrees alone. Used when a path pattern carries no
/// locale placeholder, so all tasks share one physical file.
#[derive(Debug, Default)]
pub struct RootKeyStage;

impl RootKeyStage {
    pub fn new() -> Self {
        RootKeyStage
    }
}

impl Transform for RootKeyStage {
    fn name(&self) -> &'static str {
        "root-key"
    }

    fn pull(&mut self, locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let subtree = input
            .get(locale)
            .cloned()
            .unwrap_or(Value::Object(Map::new()));
        Ok(subtree)
    }

    fn push(&mut self, locale: &str, data: Value, ctx: StageContext<'_>) -> Result<Value> {
        let mut document = match ctx.last_pull_input {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        document.insert(locale.to_string(), data);
        Ok(Value::Object(document))
    }
}
