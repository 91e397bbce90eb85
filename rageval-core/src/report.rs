//! The final evaluation report and its JSON persistence.

use crate::aggregate::aggregate;
use crate::case::CaseResult;
use crate::config::ComplianceConfig;
use crate::error::Result;
use crate::metrics::MetricScores;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Overall averages and latency percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub faithfulness: f64,
    pub context_precision: f64,
    pub answer_relevance: f64,
    pub latency_p50: f64,
    pub latency_p90: f64,
}

/// Average faithfulness over cases whose category contains `marker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSlice {
    pub marker: String,
    pub label: String,
    pub cases: usize,
    pub faithfulness: f64,
}

impl ComplianceSlice {
    /// `None` when no result falls in a matching category.
    pub fn compute(results: &[CaseResult], config: &ComplianceConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let matching: Vec<f64> = results
            .iter()
            .filter(|r| r.category.contains(&config.marker))
            .map(|r| r.faithfulness)
            .collect();
        if matching.is_empty() {
            return None;
        }
        Some(Self {
            marker: config.marker.clone(),
            label: config.label.clone(),
            cases: matching.len(),
            faithfulness: matching.iter().sum::<f64>() / matching.len() as f64,
        })
    }
}

/// Result of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub metrics: ReportMetrics,
    pub by_category: BTreeMap<String, MetricScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceSlice>,
    pub results: Vec<CaseResult>,
}

impl Report {
    /// Build a report stamped with the current time.
    pub fn build(results: Vec<CaseResult>, compliance: &ComplianceConfig) -> Self {
        Self::build_at(results, compliance, Utc::now())
    }

    pub fn build_at(
        results: Vec<CaseResult>,
        compliance: &ComplianceConfig,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let summary = aggregate(&results);
        let compliance = ComplianceSlice::compute(&results, compliance);
        Self {
            timestamp,
            metrics: ReportMetrics {
                faithfulness: summary.overall.faithfulness,
                context_precision: summary.overall.precision,
                answer_relevance: summary.overall.relevance,
                latency_p50: summary.latency.p50,
                latency_p90: summary.latency.p90,
            },
            by_category: summary.by_category,
            compliance,
            results,
        }
    }

    pub fn case_count(&self) -> usize {
        self.results.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON, replacing any existing file.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), cases = self.case_count(), "Wrote report");
        Ok(())
    }
}
