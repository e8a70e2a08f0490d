use color_eyre::eyre::Result;
use locflow_domain::TaskStatus;
use locflow_services::{ExecuteOptions, PlanOptions, PseudoBackend};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::atomic::Ordering;

pub async fn run(
    root: &Path,
    opts: PlanOptions,
    force: bool,
    concurrency: Option<usize>,
    format: &str,
    use_color: bool,
) -> Result<()> {
    let config = super::load_project_config(root)?;
    let lock_path = super::lock_path(root, &config);
    let partial_locales = !opts.locale_filter.is_empty();
    let tasks = locflow_services::plan(root, &config, &opts)?;

    let mut exec = ExecuteOptions::new(root, lock_path);
    exec.force = force;
    exec.persist_fingerprints = !partial_locales;
    if let Some(n) = concurrency.or(config.concurrency) {
        exec.concurrency = n;
    }

    // Let the write in flight finish, then stop scheduling tasks.
    let cancel = exec.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(event = "interrupt_received");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let backend = PseudoBackend::default();
    let summary = locflow_services::execute(&tasks, &backend, &exec).await;

    match format {
        "json" => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), &summary)?;
            println!();
        }
        _ => {
            for task in &summary.tasks {
                let line = format!(
                    "{} {} {} → {}",
                    task.format, task.path_pattern, task.source_locale, task.target_locale
                );
                match task.status {
                    TaskStatus::Success => {
                        if use_color {
                            println!("{} {} ({} key(s))", "✔".green(), line, task.translated_keys);
                        } else {
                            println!("✔ {} ({} key(s))", line, task.translated_keys);
                        }
                    }
                    TaskStatus::Skipped => {
                        if use_color {
                            println!("{} {} (no changes)", "≡".dimmed(), line);
                        } else {
                            println!("≡ {} (no changes)", line);
                        }
                    }
                    TaskStatus::Error => {
                        let message = task.error.as_deref().unwrap_or("unknown error");
                        if use_color {
                            println!("{} {} — {}", "✖".red(), line, message);
                        } else {
                            println!("✖ {} — {}", line, message);
                        }
                    }
                }
            }
            println!(
                "{} succeeded, {} failed, {} skipped",
                summary.succeeded, summary.failed, summary.skipped
            );
        }
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
