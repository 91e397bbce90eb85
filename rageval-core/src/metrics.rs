//! Text-overlap quality metrics for generated answers.
//!
//! All three metrics are pure functions over normalized tokens (see
//! [`crate::tokenize`]) and return a value in `[0, 1]`. A missing required
//! input scores `0`, never `NaN`.

use crate::tokenize::{normalize, tokens};
use serde::{Deserialize, Serialize};

/// The three per-answer scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub faithfulness: f64,
    pub relevance: f64,
    pub precision: f64,
}

impl MetricScores {
    /// Score `answer` for `question` against the retrieved `contexts`.
    pub fn score(answer: &str, question: &str, contexts: &[String]) -> Self {
        Self {
            faithfulness: faithfulness(answer, contexts),
            relevance: relevance(answer, question),
            precision: context_precision(answer, contexts),
        }
    }
}

/// Fraction of the answer's tokens that occur anywhere in the context.
///
/// The denominator is the raw answer token count, so a word grounded in the
/// context counts once per occurrence in the answer.
pub fn faithfulness(answer: &str, contexts: &[String]) -> f64 {
    if contexts.is_empty() {
        return 0.0;
    }
    let ans_words = tokens(answer);
    if ans_words.is_empty() {
        return 0.0;
    }
    let ctx_words = normalize(&contexts.join(" "));
    let hits = ans_words.iter().filter(|w| ctx_words.contains(*w)).count();
    (hits as f64 / ans_words.len() as f64).min(1.0)
}

/// Fraction of distinct question tokens echoed in the answer.
pub fn relevance(answer: &str, question: &str) -> f64 {
    let q_words = normalize(question);
    if q_words.is_empty() {
        return 0.0;
    }
    let a_words = normalize(answer);
    let overlap = q_words.intersection(&a_words).count();
    overlap as f64 / q_words.len() as f64
}

/// Best overlap between the answer and any single context chunk.
///
/// Each chunk is scored as `|answer ∩ chunk| / |answer|` over distinct tokens
/// and the maximum is taken, so adding a chunk never lowers the score.
pub fn context_precision(answer: &str, contexts: &[String]) -> f64 {
    if contexts.is_empty() {
        return 0.0;
    }
    let a_words = normalize(answer);
    if a_words.is_empty() {
        return 0.0;
    }
    contexts
        .iter()
        .map(|ctx| {
            let c_words = normalize(ctx);
            a_words.intersection(&c_words).count() as f64 / a_words.len() as f64
        })
        .fold(0.0, f64::max)
}
