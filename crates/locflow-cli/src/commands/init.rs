use color_eyre::eyre::{bail, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(root: &Path, force: bool, use_color: bool) -> Result<()> {
    let path = root.join(locflow_config::CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    std::fs::write(&path, locflow_config::STARTER_CONFIG)?;
    tracing::info!(event = "config_written", path = %path.display());
    if use_color {
        println!("{} config written to {}", "✔".green(), path.display());
    } else {
        println!("✔ config written to {}", path.display());
    }
    Ok(())
}
