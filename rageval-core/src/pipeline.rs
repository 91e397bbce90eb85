//! The pipeline-under-test interface and a built-in mock implementation.

use crate::config::MockPipelineConfig;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// What a pipeline returns for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub answer: String,
    /// Latency reported by the pipeline itself. A non-positive value means
    /// "not reported" and the evaluator falls back to its own measurement.
    pub latency_ms: f64,
}

impl PipelineResponse {
    pub fn new(answer: impl Into<String>, latency_ms: f64) -> Self {
        Self {
            answer: answer.into(),
            latency_ms,
        }
    }

    /// Reported latency if usable, otherwise `measured_ms`.
    pub fn latency_or(&self, measured_ms: f64) -> f64 {
        if self.latency_ms.is_finite() && self.latency_ms > 0.0 {
            self.latency_ms
        } else {
            measured_ms
        }
    }
}

/// A retrieval-augmented generation pipeline under evaluation.
#[async_trait]
pub trait RagPipeline: Send + Sync {
    fn name(&self) -> &str;

    /// Answer `question` using the retrieved `context` chunks.
    async fn answer(&self, question: &str, context: &[String]) -> PipelineResponse;
}

/// Source of simulated latency values.
pub enum SimulatedLatency {
    Fixed(f64),
    Uniform {
        min_ms: f64,
        max_ms: f64,
        rng: Mutex<StdRng>,
    },
}

impl SimulatedLatency {
    pub fn fixed(ms: f64) -> Self {
        Self::Fixed(ms)
    }

    /// Uniform latency in `[min_ms, max_ms)`; reproducible when `seed` is set.
    pub fn uniform(min_ms: f64, max_ms: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::Uniform {
            min_ms,
            max_ms,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &MockPipelineConfig) -> Self {
        Self::uniform(config.min_latency_ms, config.max_latency_ms, config.seed)
    }

    pub async fn next_ms(&self) -> f64 {
        match self {
            Self::Fixed(ms) => *ms,
            Self::Uniform { min_ms, max_ms, rng } => {
                if max_ms <= min_ms {
                    return *min_ms;
                }
                rng.lock().await.gen_range(*min_ms..*max_ms)
            }
        }
    }
}

/// Stand-in pipeline that echoes the leading clauses of the first context chunk.
pub struct MockPipeline {
    latency: SimulatedLatency,
}

impl MockPipeline {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self { latency }
    }

    pub fn from_config(config: &MockPipelineConfig) -> Self {
        Self::new(SimulatedLatency::from_config(config))
    }
}

#[async_trait]
impl RagPipeline for MockPipeline {
    fn name(&self) -> &str {
        "mock"
    }

    async fn answer(&self, _question: &str, context: &[String]) -> PipelineResponse {
        let answer = mock_answer(context);
        PipelineResponse::new(answer, self.latency.next_ms().await)
    }
}

/// Clauses shorter than this are skipped when composing a mock answer.
const MIN_CLAUSE_CHARS: usize = 10;
const FALLBACK_EXCERPT_CHARS: usize = 150;

/// Build the mock answer for a context list.
pub fn mock_answer(context: &[String]) -> String {
    let Some(first) = context.first() else {
        return "No relevant context found".to_string();
    };
    let clauses: Vec<&str> = first
        .split([';', ',', '.'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_CLAUSE_CHARS)
        .collect();
    match clauses.as_slice() {
        [] => {
            let excerpt: String = first.chars().take(FALLBACK_EXCERPT_CHARS).collect();
            format!("Per guidelines: {excerpt}")
        }
        [lead, rest @ ..] => format!(
            "Based on documentation: {lead}. {}",
            rest.first().copied().unwrap_or_default()
        ),
    }
}
