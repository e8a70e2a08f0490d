pub mod delta;
pub mod init;
pub mod plan;
pub mod run;

use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};

/// Load the project config, preferring the file next to `root`.
pub fn load_project_config(root: &Path) -> Result<locflow_config::LocFlowConfig> {
    match locflow_config::load_file(&root.join(locflow_config::CONFIG_FILE_NAME))? {
        Some(cfg) => Ok(cfg),
        None => Ok(locflow_config::load_config()?),
    }
}

pub fn lock_path(root: &Path, config: &locflow_config::LocFlowConfig) -> PathBuf {
    let name = config
        .lock_file
        .as_deref()
        .unwrap_or(locflow_delta::LOCK_FILE_NAME);
    root.join(name)
}
