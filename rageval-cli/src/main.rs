//! rageval CLI — score a RAG pipeline against a fixed case set.
//!
//! Runs an evaluation by default; `rageval config` manages configuration.

mod commands;

use anyhow::Context;
use clap::Parser;
use rageval_core::EvalConfig;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// rageval: offline faithfulness, relevance and context-precision scoring
#[derive(Parser, Debug)]
#[command(name = "rageval", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (looked up for .rageval/config.toml)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential log output
    #[arg(short, long)]
    quiet: bool,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides applied on top of the loaded configuration.
#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// YAML case set with a `qa_pairs` list
    #[arg(long)]
    case_set: Option<PathBuf>,

    /// Report output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Score only the first N cases (0 = all)
    #[arg(long)]
    limit: Option<usize>,

    /// Maximum pipeline calls in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-case pipeline timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Seed for the mock pipeline's simulated latency
    #[arg(long)]
    seed: Option<u64>,
}

impl RunArgs {
    fn apply(&self, config: &mut EvalConfig) {
        if let Some(path) = &self.case_set {
            config.case_set = path.clone();
        }
        if let Some(path) = &self.output {
            config.report_path = path.clone();
        }
        if let Some(limit) = self.limit {
            config.max_cases = limit;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.case_timeout_ms = Some(timeout_ms);
        }
        if let Some(seed) = self.seed {
            config.mock.seed = Some(seed);
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show effective configuration
    Show,
}

/// Daily-rolling non-blocking writer for JSON logs under `log_dir`.
fn json_log_writer(log_dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Cannot create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "rageval.log");
    Ok(tracing_appender::non_blocking(file_appender))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr; stdout is reserved for the summary
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // Optional JSON file layer
    let mut _guard = None;
    let json_layer = match cli.log_dir.as_deref() {
        Some(log_dir) => {
            let (non_blocking, guard) = json_log_writer(log_dir)?;
            _guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if let Some(command) = cli.command {
        return commands::handle_command(command, &workspace, cli.config.as_deref()).await;
    }

    let mut config = rageval_core::load_config(Some(&workspace), cli.config.as_deref())?;
    cli.run.apply(&mut config);

    commands::run_evaluation(&config).await
}
