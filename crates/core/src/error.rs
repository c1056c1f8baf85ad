//! Error types for the docsgpt domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::corpus::ChunkId;

/// The top-level error type for all docsgpt operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Vector index errors ---
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    // --- Corpus errors ---
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    // --- Tokenizer errors ---
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Index not found: {0}")]
    NotFound(String),

    #[error("Vector for chunk {id} has dimension {actual}, index expects {expected}")]
    DimensionMismatch {
        id: ChunkId,
        expected: usize,
        actual: usize,
    },

    #[error("Index not ready: {0}")]
    NotReady(String),

    #[error("Index returned a non-numeric match id: {0}")]
    InvalidMatchId(String),

    #[error("Index request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum CorpusError {
    /// A ranked match points at a chunk the corpus does not hold.
    #[error("Chunk {id} not found in corpus")]
    NotFound { id: ChunkId },

    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Malformed row {row} in {path}: {reason}")]
    MalformedRow {
        path: String,
        row: usize,
        reason: String,
    },

    #[error("Duplicate chunk id {id} in {path}")]
    DuplicateId { path: String, id: ChunkId },
}

#[derive(Debug, Clone, Error)]
pub enum TokenizerError {
    #[error("No tokenizer known for model: {0}")]
    UnknownModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn corpus_lookup_error_names_the_chunk() {
        let err: Error = CorpusError::NotFound { id: 42 }.into();
        assert!(matches!(err, Error::Corpus(CorpusError::NotFound { id: 42 })));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn dimension_mismatch_reports_both_sizes() {
        let err = IndexError::DimensionMismatch {
            id: 7,
            expected: 1536,
            actual: 3,
        };
        let text = err.to_string();
        assert!(text.contains("1536"));
        assert!(text.contains("3"));
        assert!(text.contains("chunk 7"));
    }
}
