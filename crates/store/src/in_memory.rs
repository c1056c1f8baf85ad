//! In-memory vector index: brute-force cosine search.
//!
//! Stands in for the hosted index in offline runs and tests. Upserting an
//! existing id overwrites it, matching hosted-index semantics.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use docsgpt_core::corpus::ChunkId;
use docsgpt_core::error::IndexError;
use docsgpt_core::index::{IndexStats, RankedMatch, VectorIndex, VectorRecord, check_dimensions};
use tokio::sync::RwLock;

use crate::vector::cosine_similarity;

pub struct InMemoryIndex {
    name: String,
    dimension: usize,
    vectors: Arc<RwLock<BTreeMap<ChunkId, Vec<f32>>>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            vectors: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, IndexError> {
        check_dimensions(records, self.dimension)?;
        let mut vectors = self.vectors.write().await;
        for record in records {
            vectors.insert(record.id, record.values.clone());
        }
        Ok(records.len())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RankedMatch>, IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::ApiError {
                status_code: 400,
                message: format!(
                    "query vector has dimension {}, index expects {}",
                    vector.len(),
                    self.dimension
                ),
            });
        }

        let vectors = self.vectors.read().await;
        let mut scored: Vec<RankedMatch> = vectors
            .iter()
            .map(|(id, values)| RankedMatch::new(*id, cosine_similarity(values, vector)))
            .collect();

        // Stable sort over id order keeps ties deterministic.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn stats(&self) -> Result<IndexStats, IndexError> {
        Ok(IndexStats {
            vector_count: self.vectors.read().await.len() as u64,
            dimension: self.dimension,
        })
    }
}
