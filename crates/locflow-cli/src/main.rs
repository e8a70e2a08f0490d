mod commands;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "locflow", version, about = "Incremental localization pipeline")]
struct Cli {
    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter locflow.toml into the current directory
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Show the expanded task list without executing anything
    Plan {
        #[command(flatten)]
        filters: TaskFilters,
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show what changed since the last recorded fingerprints
    Delta {
        #[command(flatten)]
        filters: TaskFilters,
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Translate everything the delta engine says has changed
    Run {
        #[command(flatten)]
        filters: TaskFilters,
        /// Retranslate every key, ignoring recorded fingerprints
        #[arg(long, default_value_t = false)]
        force: bool,
        /// Concurrent backend calls (also bounds workers)
        #[arg(long)]
        concurrency: Option<usize>,
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct TaskFilters {
    /// Only buckets of this format (json, xml, text)
    #[arg(long)]
    bucket: Option<String>,
    /// Only path patterns containing this substring
    #[arg(long)]
    file: Option<String>,
    /// Only keys matching these globs
    #[arg(long)]
    key: Vec<String>,
    /// Only these target locales
    #[arg(long)]
    locale: Vec<String>,
}

impl TaskFilters {
    fn into_plan_options(self) -> locflow_services::PlanOptions {
        locflow_services::PlanOptions {
            bucket_filter: self.bucket,
            file_filter: self.file,
            key_filter: self.key,
            locale_filter: self.locale,
        }
    }
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "locflow.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn project_root() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing();

    let cli = Cli::parse();
    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    let root = project_root()?;
    match cli.cmd {
        Commands::Init { force } => commands::init::run(&root, force, use_color),
        Commands::Plan { filters, format } => {
            commands::plan::run(&root, filters.into_plan_options(), &format, use_color)
        }
        Commands::Delta { filters, format } => {
            commands::delta::run(&root, filters.into_plan_options(), &format, use_color)
        }
        Commands::Run {
            filters,
            force,
            concurrency,
            format,
        } => {
            commands::run::run(
                &root,
                filters.into_plan_options(),
                force,
                concurrency,
                &format,
                use_color,
            )
            .await
        }
    }
}
