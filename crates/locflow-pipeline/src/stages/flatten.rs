use crate::stage::{StageContext, Transform};
use crate::value::{flatten, unflatten};
use locflow_core::Result;
use serde_json::Value;

/// Flattens nested payloads into a single-level `/`-joined key map on
/// pull and rebuilds the nested shape on push.
#[derive(Debug, Default)]
pub struct FlattenStage;

impl FlattenStage {
    pub fn new() -> Self {
        FlattenStage
    }
}

impl Transform for FlattenStage {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        Ok(Value::Object(flatten(&input)))
    }

    fn push(&mut self, _locale: &str, data: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let flat = match data {
            Value::Object(map) => map,
            other => return Ok(other),
        };
        Ok(unflatten(&flat))
    }
}
