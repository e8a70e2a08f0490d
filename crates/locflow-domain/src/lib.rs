use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One entry of the expanded task plan, as shown by `locflow plan`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedTask {
    pub schema_version: u32,
    pub format: String,
    pub path_pattern: String,
    pub source_locale: String,
    pub target_locale: String,
}

/// Terminal state of one executed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskReport {
    pub schema_version: u32,
    pub format: String,
    pub path_pattern: String,
    pub source_locale: String,
    pub target_locale: String,
    pub status: TaskStatus,
    /// Present only when `status == Error`.
    pub error: Option<String>,
    /// Keys actually sent to the backend (post-delta, post-filter).
    pub translated_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub schema_version: u32,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub tasks: Vec<TaskReport>,
}

/// Per-file delta classification, as shown by `locflow delta`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeltaReport {
    pub schema_version: u32,
    pub path_pattern: String,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub renamed: Vec<(String, String)>,
    pub unchanged: usize,
}

impl RunSummary {
    pub fn from_reports(tasks: Vec<TaskReport>) -> Self {
        let succeeded = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Success)
            .count();
        let failed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Error)
            .count();
        let skipped = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Skipped)
            .count();
        RunSummary {
            schema_version: SCHEMA_VERSION,
            total: tasks.len(),
            succeeded,
            failed,
            skipped,
            tasks,
        }
    }
}
