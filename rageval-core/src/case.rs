//! Test cases, their scored results, and the YAML case set loader.

use crate::error::{EvalError, Result};
use crate::metrics::MetricScores;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

/// Category assigned to cases that do not declare one.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One question with its retrieved context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub context: Vec<String>,
}

impl TestCase {
    pub fn new(question: impl Into<String>, context: Vec<String>) -> Self {
        Self {
            id: None,
            category: None,
            question: question.into(),
            context,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The declared id, or `Q<n>` for the zero-based `position` (1-indexed label).
    pub fn label(&self, position: usize) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("Q{}", position + 1))
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN_CATEGORY)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Scores for a single evaluated case. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: String,
    pub category: String,
    pub faithfulness: f64,
    pub relevance: f64,
    pub precision: f64,
    pub latency_ms: f64,
}

impl CaseResult {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        scores: MetricScores,
        latency_ms: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            faithfulness: scores.faithfulness,
            relevance: scores.relevance,
            precision: scores.precision,
            latency_ms,
        }
    }

    pub fn scores(&self) -> MetricScores {
        MetricScores {
            faithfulness: self.faithfulness,
            relevance: self.relevance,
            precision: self.precision,
        }
    }
}

/// An ordered set of test cases as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSet {
    pub qa_pairs: Vec<TestCase>,
}

impl CaseSet {
    /// Load a case set from a YAML file.
    ///
    /// A missing file and an unparsable file are distinct errors; both are
    /// fatal for a run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EvalError::CaseSetMissing {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let set: CaseSet =
            serde_yaml::from_str(&raw).map_err(|e| EvalError::CaseSetParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        info!(path = %path.display(), cases = set.qa_pairs.len(), "Loaded case set");
        Ok(set)
    }

    /// Keep only the first `max_cases` cases; `0` keeps all.
    pub fn truncated(mut self, max_cases: usize) -> Self {
        if max_cases > 0 {
            self.qa_pairs.truncate(max_cases);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.qa_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qa_pairs.is_empty()
    }
}
