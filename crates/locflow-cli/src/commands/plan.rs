use color_eyre::eyre::Result;
use locflow_domain::{PlannedTask, SCHEMA_VERSION};
use locflow_services::PlanOptions;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(root: &Path, opts: PlanOptions, format: &str, use_color: bool) -> Result<()> {
    let config = super::load_project_config(root)?;
    let tasks = locflow_services::plan(root, &config, &opts)?;

    match format {
        "json" => {
            let items: Vec<PlannedTask> = tasks
                .iter()
                .map(|t| PlannedTask {
                    schema_version: SCHEMA_VERSION,
                    format: t.format.to_string(),
                    path_pattern: t.path_pattern.clone(),
                    source_locale: t.source_locale.clone(),
                    target_locale: t.target_locale.clone(),
                })
                .collect();
            serde_json::to_writer_pretty(std::io::stdout().lock(), &items)?;
            println!();
        }
        _ => {
            if tasks.is_empty() {
                println!("no tasks to run");
                return Ok(());
            }
            for task in &tasks {
                if use_color {
                    println!(
                        "{} {} {} {} → {}",
                        "•".cyan(),
                        task.format,
                        task.path_pattern.blue(),
                        task.source_locale,
                        task.target_locale.green()
                    );
                } else {
                    println!(
                        "• {} {} {} → {}",
                        task.format, task.path_pattern, task.source_locale, task.target_locale
                    );
                }
            }
            println!("{} task(s)", tasks.len());
        }
    }
    Ok(())
}
