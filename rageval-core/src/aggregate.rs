//! Folding case results into overall, per-category and latency summaries.

use crate::case::CaseResult;
use crate::metrics::MetricScores;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running sums for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryAccumulator {
    count: usize,
    sum_faithfulness: f64,
    sum_relevance: f64,
    sum_precision: f64,
}

impl CategoryAccumulator {
    fn add(&mut self, result: &CaseResult) {
        self.count += 1;
        self.sum_faithfulness += result.faithfulness;
        self.sum_relevance += result.relevance;
        self.sum_precision += result.precision;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of each metric; all zero when nothing was added.
    pub fn averages(&self) -> MetricScores {
        if self.count == 0 {
            return MetricScores::default();
        }
        let n = self.count as f64;
        MetricScores {
            faithfulness: self.sum_faithfulness / n,
            relevance: self.sum_relevance / n,
            precision: self.sum_precision / n,
        }
    }
}

/// Nearest-rank latency percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub p50: f64,
    pub p90: f64,
}

impl LatencyPercentiles {
    pub fn from_latencies(latencies: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = latencies.into_iter().collect();
        sorted.sort_by(f64::total_cmp);
        Self {
            p50: percentile(&sorted, 0.5),
            p90: percentile(&sorted, 0.9),
        }
    }
}

/// Value at index `floor(n * q)` of an ascending slice, clamped to the last
/// element. No interpolation. Empty input yields `0`.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (sorted.len() as f64 * q).floor() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Read-only summary of a sequence of case results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub cases: usize,
    pub overall: MetricScores,
    pub by_category: BTreeMap<String, MetricScores>,
    pub latency: LatencyPercentiles,
}

/// Summarize `results` in a single sequential fold.
pub fn aggregate(results: &[CaseResult]) -> Aggregate {
    let mut overall = CategoryAccumulator::default();
    let mut categories: BTreeMap<&str, CategoryAccumulator> = BTreeMap::new();
    for result in results {
        overall.add(result);
        categories.entry(result.category.as_str()).or_default().add(result);
    }

    Aggregate {
        cases: results.len(),
        overall: overall.averages(),
        by_category: categories
            .into_iter()
            .map(|(category, acc)| (category.to_string(), acc.averages()))
            .collect(),
        latency: LatencyPercentiles::from_latencies(results.iter().map(|r| r.latency_ms)),
    }
}
