//! Vector index trait: upsert embeddings, query nearest neighbours.
//!
//! The hosted index is opaque; this is the narrow surface the
//! orchestrator needs from it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::corpus::ChunkId;
use crate::error::IndexError;

/// An embedding vector keyed by the chunk it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: ChunkId,
    pub values: Vec<f32>,
}

/// A chunk id with its relevance score from a similarity query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub id: ChunkId,
    pub score: f32,
}

impl RankedMatch {
    pub fn new(id: ChunkId, score: f32) -> Self {
        Self { id, score }
    }
}

/// Summary reported by an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of stored vectors.
    pub vector_count: u64,
    /// Configured vector dimension.
    pub dimension: usize,
}

/// The vector index abstraction.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Index name (for logging).
    fn name(&self) -> &str;

    /// Dimension every stored vector must have.
    fn dimension(&self) -> usize;

    /// Insert or overwrite vectors. Returns the number upserted.
    ///
    /// Fails with `IndexError::DimensionMismatch` before storing anything if
    /// any record has the wrong length.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, IndexError>;

    /// Return up to `top_k` matches, most similar first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RankedMatch>, IndexError>;

    /// Current index statistics.
    async fn stats(&self) -> Result<IndexStats, IndexError>;
}

/// Reject any record whose length differs from `dimension`.
pub fn check_dimensions(records: &[VectorRecord], dimension: usize) -> Result<(), IndexError> {
    match records.iter().find(|r| r.values.len() != dimension) {
        Some(bad) => Err(IndexError::DimensionMismatch {
            id: bad.id,
            expected: dimension,
            actual: bad.values.len(),
        }),
        None => Ok(()),
    }
}
