use color_eyre::eyre::Result;
use locflow_services::PlanOptions;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(root: &Path, opts: PlanOptions, format: &str, use_color: bool) -> Result<()> {
    let config = super::load_project_config(root)?;
    let lock_path = super::lock_path(root, &config);
    let tasks = locflow_services::plan(root, &config, &opts)?;
    let reports = locflow_services::inspect_delta(root, &lock_path, &tasks)?;

    match format {
        "json" => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), &reports)?;
            println!();
        }
        _ => {
            for report in &reports {
                let changed =
                    report.added.len() + report.updated.len() + report.renamed.len();
                if use_color {
                    println!(
                        "{} {}: {} added, {} updated, {} renamed, {} unchanged",
                        if changed > 0 { "Δ".yellow().to_string() } else { "=".green().to_string() },
                        report.path_pattern.blue(),
                        report.added.len(),
                        report.updated.len(),
                        report.renamed.len(),
                        report.unchanged
                    );
                } else {
                    println!(
                        "{} {}: {} added, {} updated, {} renamed, {} unchanged",
                        if changed > 0 { "Δ" } else { "=" },
                        report.path_pattern,
                        report.added.len(),
                        report.updated.len(),
                        report.renamed.len(),
                        report.unchanged
                    );
                }
                for key in &report.added {
                    println!("    + {key}");
                }
                for key in &report.updated {
                    println!("    ~ {key}");
                }
                for (old, new) in &report.renamed {
                    println!("    → {old} => {new}");
                }
            }
        }
    }
    Ok(())
}
