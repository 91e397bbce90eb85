//! CLI subcommand handlers and the default evaluation run.

use crate::Commands;
use crate::ConfigAction;
use rageval_core::config::{render_config, write_default_config};
use rageval_core::{EvalConfig, EvalError, MockPipeline, RagPipeline, evaluate_case_set, render};
use std::path::Path;
use std::sync::Arc;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace, config_file),
    }
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => match write_default_config(workspace) {
            Ok(path) => {
                println!("Created default configuration at: {}", path.display());
                Ok(())
            }
            Err(EvalError::ConfigExists { path }) => {
                println!("Configuration file already exists at: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        ConfigAction::Show => {
            let config = rageval_core::load_config(Some(workspace), config_file)?;
            println!("{}", render_config(&config)?);
            Ok(())
        }
    }
}

/// Score the configured case set with the mock pipeline, print the summary
/// and write the report.
///
/// Low scores are reported, not treated as failures.
pub async fn run_evaluation(config: &EvalConfig) -> anyhow::Result<()> {
    let pipeline: Arc<dyn RagPipeline> = Arc::new(MockPipeline::from_config(&config.mock));
    let report = evaluate_case_set(config, pipeline).await?;

    report.write_json(&config.report_path)?;

    let report_path = config.report_path.display().to_string();
    print!(
        "{}",
        render::summary(&report, &config.thresholds, Some(&report_path))
    );
    Ok(())
}
