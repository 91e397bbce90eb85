//! Configuration for evaluation runs.
//!
//! Loaded with `figment` from layered sources, lowest precedence first:
//! built-in defaults, the user config file, the workspace config file, an
//! explicit config file, then `RAGEVAL_*` environment variables.

use crate::error::{EvalError, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// YAML file holding the `qa_pairs` case set.
    #[serde(default = "default_case_set")]
    pub case_set: PathBuf,
    /// Where the JSON report is written. Overwritten on every run.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    /// Score only the first N cases; `0` scores all of them.
    #[serde(default = "default_max_cases")]
    pub max_cases: usize,
    /// Maximum pipeline calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-case pipeline timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_timeout_ms: Option<u64>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub compliance: ComplianceConfig,
    #[serde(default)]
    pub mock: MockPipelineConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            case_set: default_case_set(),
            report_path: default_report_path(),
            max_cases: default_max_cases(),
            concurrency: default_concurrency(),
            case_timeout_ms: None,
            thresholds: Thresholds::default(),
            compliance: ComplianceConfig::default(),
            mock: MockPipelineConfig::default(),
        }
    }
}

fn default_case_set() -> PathBuf {
    PathBuf::from("evalset.yaml")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("eval").join("baseline_results.json")
}

fn default_max_cases() -> usize {
    10
}

fn default_concurrency() -> usize {
    1
}

/// A target for one aggregate metric.
///
/// At or above `target` passes, at or above `partial` is a partial pass,
/// anything lower fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricTarget {
    pub target: f64,
    pub partial: f64,
}

impl MetricTarget {
    pub const fn new(target: f64, partial: f64) -> Self {
        Self { target, partial }
    }
}

/// Status bands and aggregate targets used when rendering a report.
///
/// None of these feed back into scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Per-case faithfulness at or above this is shown as passing.
    #[serde(default = "default_case_pass")]
    pub case_pass: f64,
    /// Per-case faithfulness at or above this is shown as a warning.
    #[serde(default = "default_case_warn")]
    pub case_warn: f64,
    /// Median latency must not exceed this.
    #[serde(default = "default_latency_p50_ms")]
    pub latency_p50_ms: f64,
    #[serde(default = "default_faithfulness_target")]
    pub faithfulness: MetricTarget,
    #[serde(default = "default_precision_target")]
    pub context_precision: MetricTarget,
    #[serde(default = "default_relevance_target")]
    pub answer_relevance: MetricTarget,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            case_pass: default_case_pass(),
            case_warn: default_case_warn(),
            latency_p50_ms: default_latency_p50_ms(),
            faithfulness: default_faithfulness_target(),
            context_precision: default_precision_target(),
            answer_relevance: default_relevance_target(),
        }
    }
}

fn default_case_pass() -> f64 {
    0.75
}

fn default_case_warn() -> f64 {
    0.50
}

fn default_faithfulness_target() -> MetricTarget {
    MetricTarget::new(0.85, 0.75)
}

fn default_precision_target() -> MetricTarget {
    MetricTarget::new(0.80, 0.70)
}

fn default_relevance_target() -> MetricTarget {
    MetricTarget::new(0.85, 0.75)
}

fn default_latency_p50_ms() -> f64 {
    800.0
}

/// Faithfulness sub-slice over regulation-flagged categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Substring a category must contain to join the slice.
    #[serde(default = "default_compliance_marker")]
    pub marker: String,
    /// Display label for the console summary.
    #[serde(default = "default_compliance_label")]
    pub label: String,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker: default_compliance_marker(),
            label: default_compliance_label(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_compliance_marker() -> String {
    "medicare".to_string()
}

fn default_compliance_label() -> String {
    "Medicare compliance".to_string()
}

/// Latency simulation for the built-in mock pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockPipelineConfig {
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: f64,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: f64,
    /// Fixed RNG seed; simulated latencies are reproducible when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MockPipelineConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
            seed: None,
        }
    }
}

fn default_min_latency_ms() -> f64 {
    300.0
}

fn default_max_latency_ms() -> f64 {
    800.0
}

/// Workspace-relative location of the workspace config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".rageval").join("config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "rageval", "rageval")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration by merging every layer.
///
/// Missing optional files are skipped. An explicit `config_file` that does
/// not exist is an error.
pub fn load_config(workspace: Option<&Path>, config_file: Option<&Path>) -> Result<EvalConfig> {
    let mut figment = Figment::from(Serialized::defaults(EvalConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(EvalError::Config(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            )))));
        }
        figment = figment.merge(Toml::file(path));
    }

    // RAGEVAL_MAX_CASES, RAGEVAL_THRESHOLDS__FAITHFULNESS__TARGET, etc.
    figment = figment.merge(Env::prefixed("RAGEVAL_").split("__"));

    figment
        .extract()
        .map_err(|e| EvalError::Config(Box::new(e)))
}

/// Write the default configuration to `<workspace>/.rageval/config.toml`.
///
/// Refuses to overwrite an existing file.
pub fn write_default_config(workspace: &Path) -> Result<PathBuf> {
    let path = workspace_config_path(workspace);
    if path.exists() {
        return Err(EvalError::ConfigExists { path });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, render_config(&EvalConfig::default())?)?;
    Ok(path)
}

/// Serialize a configuration as pretty TOML.
pub fn render_config(config: &EvalConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
