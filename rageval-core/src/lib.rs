//! # rageval-core — offline scoring for retrieval-augmented generation
//!
//! Scores generated answers against a fixed case set along three text-overlap
//! axes (faithfulness, relevance, context precision), aggregates them per
//! category and overall, and computes nearest-rank latency percentiles.
//!
//! Data flows one way: [`CaseSet`] → [`Evaluator`] → [`CaseResult`]s →
//! [`Report`] → [`render`]. Scoring and aggregation are pure; only loading,
//! the pipeline call and persistence touch the outside world.

pub mod aggregate;
pub mod case;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod tokenize;

pub use aggregate::{Aggregate, CategoryAccumulator, LatencyPercentiles, aggregate};
pub use case::{CaseResult, CaseSet, TestCase};
pub use config::{EvalConfig, MetricTarget, Thresholds, load_config};
pub use error::{EvalError, Result};
pub use evaluator::Evaluator;
pub use metrics::{MetricScores, context_precision, faithfulness, relevance};
pub use pipeline::{MockPipeline, PipelineResponse, RagPipeline, SimulatedLatency};
pub use report::{ComplianceSlice, Report, ReportMetrics};

use std::sync::Arc;
use tracing::{info, warn};

/// Load the configured case set and score it with `pipeline`.
///
/// Fails only if the case set is missing or unparsable, before any case is
/// scored.
pub async fn evaluate_case_set(
    config: &EvalConfig,
    pipeline: Arc<dyn RagPipeline>,
) -> Result<Report> {
    let cases = CaseSet::load(&config.case_set)?.truncated(config.max_cases);
    if cases.is_empty() {
        warn!(path = %config.case_set.display(), "Case set has no cases");
    }
    let results = Evaluator::from_config(pipeline, config)
        .run(&cases.qa_pairs)
        .await;
    let report = Report::build(results, &config.compliance);
    info!(
        cases = report.case_count(),
        faithfulness = report.metrics.faithfulness,
        context_precision = report.metrics.context_precision,
        answer_relevance = report.metrics.answer_relevance,
        latency_p50 = report.metrics.latency_p50,
        "Evaluation complete"
    );
    Ok(report)
}
