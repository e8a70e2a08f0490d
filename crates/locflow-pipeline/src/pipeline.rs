use crate::stage::{Stage, Transform};
use locflow_core::Result;
use serde_json::Value;

/// Ordered composition of stages exposing one Stage-shaped contract.
///
/// Pull threads input through the stages in forward order; push threads in
/// reverse, so the stage closest to raw bytes serializes last. Never share
/// a pipeline between concurrent tasks; each task builds its own.
pub struct Pipeline {
    stages: Vec<Stage>,
    initialized: bool,
    default_locale: Option<String>,
}

impl Pipeline {
    pub fn compose(transforms: Vec<Box<dyn Transform>>) -> Self {
        Pipeline {
            stages: transforms.into_iter().map(Stage::new).collect(),
            initialized: false,
            default_locale: None,
        }
    }

    /// Broadcast init to all stages. Runs once regardless of call count.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        for stage in &mut self.stages {
            stage.init()?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Broadcast the default locale to all stages. Fails if called twice.
    pub fn set_default_locale(&mut self, locale: &str) -> Result<()> {
        for stage in &mut self.stages {
            stage.set_default_locale(locale)?;
        }
        self.default_locale = Some(locale.to_string());
        Ok(())
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.default_locale.as_deref()
    }

    pub fn pull(&mut self, locale: &str, input: Value) -> Result<Value> {
        let mut data = input;
        for stage in &mut self.stages {
            data = stage.pull(locale, data)?;
        }
        Ok(data)
    }

    pub fn push(&mut self, locale: &str, data: Value) -> Result<Value> {
        let mut data = data;
        for stage in self.stages.iter_mut().rev() {
            data = stage.push(locale, data)?;
        }
        Ok(data)
    }

    /// Forward-chain hint extraction; the first non-empty result wins.
    pub fn pull_hints(&mut self) -> Result<Option<Value>> {
        for stage in &mut self.stages {
            if let Some(hints) = stage.pull_hints()? {
                let empty = match &hints {
                    Value::Object(map) => map.is_empty(),
                    Value::Null => true,
                    _ => false,
                };
                if !empty {
                    return Ok(Some(hints));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageContext;
    use serde_json::json;

    /// Appends a marker on pull, strips it on push; records call order.
    struct Tagger {
        tag: &'static str,
        log: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
        inits: usize,
    }

    impl Transform for Tagger {
        fn name(&self) -> &'static str {
            self.tag
        }
        fn init(&mut self) -> Result<()> {
            self.inits += 1;
            assert_eq!(self.inits, 1, "init must be memoized");
            Ok(())
        }
        fn pull(&mut self, _l: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
            self.log.lock().unwrap().push(format!("pull:{}", self.tag));
            let s = input.as_str().unwrap_or_default();
            Ok(Value::String(format!("{s}>{}", self.tag)))
        }
        fn push(&mut self, _l: &str, data: Value, _ctx: StageContext<'_>) -> Result<Value> {
            self.log.lock().unwrap().push(format!("push:{}", self.tag));
            let s = data.as_str().unwrap_or_default();
            let trimmed = s
                .strip_suffix(&format!(">{}", self.tag))
                .unwrap_or(s)
                .to_string();
            Ok(Value::String(trimmed))
        }
    }

    fn tagger(
        tag: &'static str,
        log: &std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    ) -> Box<dyn Transform> {
        Box::new(Tagger {
            tag,
            log: log.clone(),
            inits: 0,
        })
    }

    #[test]
    fn pull_forward_push_reverse() {
        let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::compose(vec![tagger("a", &log), tagger("b", &log)]);
        pipeline.init().unwrap();
        pipeline.init().unwrap();
        pipeline.set_default_locale("en").unwrap();

        let pulled = pipeline.pull("en", json!("x")).unwrap();
        assert_eq!(pulled, json!("x>a>b"));

        let pushed = pipeline.push("en", pulled).unwrap();
        assert_eq!(pushed, json!("x"));

        let order = log.lock().unwrap().clone();
        assert_eq!(order, vec!["pull:a", "pull:b", "push:b", "push:a"]);
    }

    #[test]
    fn pull_ordering_enforced_through_composition() {
        let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::compose(vec![tagger("a", &log)]);
        pipeline.set_default_locale("en").unwrap();
        assert!(pipeline.pull("de", json!("x")).is_err());
    }

    #[test]
    fn hints_first_non_empty_wins() {
        struct Hinted(&'static str, Option<Value>);
        impl Transform for Hinted {
            fn name(&self) -> &'static str {
                self.0
            }
            fn pull(&mut self, _l: &str, input: Value, _c: StageContext<'_>) -> Result<Value> {
                Ok(input)
            }
            fn push(&mut self, _l: &str, data: Value, _c: StageContext<'_>) -> Result<Value> {
                Ok(data)
            }
            fn pull_hints(&mut self, _o: &Value) -> Result<Option<Value>> {
                Ok(self.1.clone())
            }
        }
        let mut pipeline = Pipeline::compose(vec![
            Box::new(Hinted("empty", Some(json!({})))),
            Box::new(Hinted("real", Some(json!({"a": "hint"})))),
        ]);
        pipeline.set_default_locale("en").unwrap();
        pipeline.pull("en", json!({})).unwrap();
        let hints = pipeline.pull_hints().unwrap();
        assert_eq!(hints, Some(json!({"a": "hint"})));
    }
}
