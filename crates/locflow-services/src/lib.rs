//! High-level orchestration layer over the pipeline, delta and format
//! crates. Intentionally thin at the seams: exposes stable functions used
//! by the CLI without leaking stage or lock-file internals.

pub mod backend;
pub mod bucket;
pub mod execute;
pub mod plan;
pub mod report;
mod util;

pub use backend::{ProgressChunk, PseudoBackend, TranslateRequest, TranslationBackend};
pub use bucket::{build_pipeline, BucketFormat};
pub use execute::{execute, ExecuteOptions, DEFAULT_BACKEND_CONCURRENCY, MAX_BACKEND_CONCURRENCY, MAX_WORKERS};
pub use plan::{plan, PlanError, PlanOptions, Task};
pub use report::inspect_delta;

pub use locflow_core::Result;
