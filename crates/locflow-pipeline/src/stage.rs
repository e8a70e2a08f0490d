use locflow_core::Result;
use serde_json::Value;
use thiserror::Error;

/// Ordering violations on a stage. These are programming errors in the
/// caller, not recoverable conditions; the execution engine surfaces them
/// per task without retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("stage `{stage}`: default locale already set")]
    DefaultLocaleAlreadySet { stage: &'static str },
    #[error("stage `{stage}`: default locale must be set before pull/push")]
    DefaultLocaleNotSet { stage: &'static str },
    #[error(
        "stage `{stage}`: pulled locale `{locale}` before default locale `{default_locale}`"
    )]
    PullOutOfOrder {
        stage: &'static str,
        locale: String,
        default_locale: String,
    },
    #[error("stage `{stage}`: push requires at least one prior pull")]
    PushBeforePull { stage: &'static str },
}

/// Read-only view of a stage's captured state, handed to the transform so
/// push can recombine its output with what pull stripped away.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub default_locale: &'a str,
    /// Input of the most recent default-locale pull.
    pub original_input: Option<&'a Value>,
    /// Input of the most recent pull, any locale.
    pub last_pull_input: Option<&'a Value>,
    /// Output of the most recent pull, any locale.
    pub last_pull_output: Option<&'a Value>,
}

/// One reversible transformation step. Implementations hold no ordering
/// state of their own; [`Stage`] enforces the contract uniformly.
pub trait Transform: Send {
    fn name(&self) -> &'static str;

    /// One-time setup. Memoized by the pipeline; must be idempotent.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn pull(&mut self, locale: &str, input: Value, ctx: StageContext<'_>) -> Result<Value>;

    fn push(&mut self, locale: &str, data: Value, ctx: StageContext<'_>) -> Result<Value>;

    /// Extract auxiliary per-key context (e.g. translator comments) from
    /// the original input. Must not affect pull/push state.
    fn pull_hints(&mut self, _original_input: &Value) -> Result<Option<Value>> {
        Ok(None)
    }
}

#[derive(Debug, Default)]
struct StageState {
    default_locale: Option<String>,
    original_input: Option<Value>,
    last_pull_input: Option<Value>,
    last_pull_output: Option<Value>,
}

/// A [`Transform`] plus the state machine of the stage contract.
pub struct Stage {
    transform: Box<dyn Transform>,
    state: StageState,
}

impl Stage {
    pub fn new(transform: Box<dyn Transform>) -> Self {
        Stage {
            transform,
            state: StageState::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.transform.name()
    }

    pub fn init(&mut self) -> Result<()> {
        self.transform.init()
    }

    /// Set the default locale. Fails if called twice.
    pub fn set_default_locale(&mut self, locale: &str) -> Result<()> {
        if self.state.default_locale.is_some() {
            return Err(StageError::DefaultLocaleAlreadySet {
                stage: self.name(),
            }
            .into());
        }
        self.state.default_locale = Some(locale.to_string());
        Ok(())
    }

    /// Pull `input` through the transform for `locale`.
    ///
    /// The first pull must be for the default locale; the input of every
    /// default-locale pull is captured as the stage's original input.
    pub fn pull(&mut self, locale: &str, input: Value) -> Result<Value> {
        let default = self
            .state
            .default_locale
            .clone()
            .ok_or(StageError::DefaultLocaleNotSet { stage: self.name() })?;
        if self.state.original_input.is_none() && locale != default {
            return Err(StageError::PullOutOfOrder {
                stage: self.name(),
                locale: locale.to_string(),
                default_locale: default,
            }
            .into());
        }
        if locale == default {
            self.state.original_input = Some(input.clone());
        }
        let output = {
            let ctx = StageContext {
                default_locale: &default,
                original_input: self.state.original_input.as_ref(),
                last_pull_input: self.state.last_pull_input.as_ref(),
                last_pull_output: self.state.last_pull_output.as_ref(),
            };
            self.transform.pull(locale, input.clone(), ctx)?
        };
        self.state.last_pull_input = Some(input);
        self.state.last_pull_output = Some(output.clone());
        Ok(output)
    }

    /// Push `data` back through the transform for `locale`, recombining it
    /// with the captured inputs. Fails if nothing has been pulled yet.
    pub fn push(&mut self, locale: &str, data: Value) -> Result<Value> {
        let default = self
            .state
            .default_locale
            .clone()
            .ok_or(StageError::DefaultLocaleNotSet { stage: self.name() })?;
        if self.state.original_input.is_none() {
            return Err(StageError::PushBeforePull { stage: self.name() }.into());
        }
        let ctx = StageContext {
            default_locale: &default,
            original_input: self.state.original_input.as_ref(),
            last_pull_input: self.state.last_pull_input.as_ref(),
            last_pull_output: self.state.last_pull_output.as_ref(),
        };
        self.transform.push(locale, data, ctx)
    }

    /// Forward the hint extraction to the transform, if a default-locale
    /// pull has captured an original input.
    pub fn pull_hints(&mut self) -> Result<Option<Value>> {
        let Some(original) = self.state.original_input.clone() else {
            return Ok(None);
        };
        self.transform.pull_hints(&original)
    }
}
