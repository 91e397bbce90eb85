//! Text normalization shared by every overlap metric.

use std::collections::HashSet;

/// Tokens of this many characters or fewer are dropped as function-word noise.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Lowercase `text`, split on whitespace runs and keep tokens longer than
/// [`MIN_TOKEN_CHARS`], in order and with duplicates.
///
/// Punctuation is not stripped: `"400mg;"` and `"400mg"` are distinct tokens.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_owned)
        .collect()
}

/// Deduplicated form of [`tokens`].
pub fn normalize(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}
