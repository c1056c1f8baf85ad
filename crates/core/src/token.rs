//! Token counting capability.

use crate::error::TokenizerError;

/// Measures text length in a model's token units.
///
/// Implementations must be deterministic: the same text and model always
/// yield the same count.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str, model: &str) -> Result<usize, TokenizerError>;
}
