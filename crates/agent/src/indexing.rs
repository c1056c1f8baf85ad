//! Index population: load precomputed embeddings into a vector index once.

use docsgpt_core::error::IndexError;
use docsgpt_core::index::{VectorIndex, VectorRecord, check_dimensions};
use serde::Serialize;
use tracing::{debug, info};

/// How to populate.
#[derive(Debug, Clone, Copy)]
pub struct PopulateOptions {
    /// Records per upsert request.
    pub batch_size: usize,
    /// Upsert even when the index already looks populated.
    pub force: bool,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PopulateOutcome {
    /// The index already held at least as many vectors as the records.
    Skipped { existing: u64 },
    Upserted { vectors: usize, batches: usize },
}

/// Upsert `records` into `index` in batches.
///
/// Every record's dimension is checked before the first request, so a bad
/// file leaves the index untouched.
pub async fn populate_index(
    index: &dyn VectorIndex,
    records: &[VectorRecord],
    options: PopulateOptions,
) -> Result<PopulateOutcome, IndexError> {
    check_dimensions(records, index.dimension())?;

    if !options.force {
        let stats = index.stats().await?;
        if stats.vector_count >= records.len() as u64 {
            info!(
                index = index.name(),
                existing = stats.vector_count,
                records = records.len(),
                "Index already populated, skipping"
            );
            return Ok(PopulateOutcome::Skipped {
                existing: stats.vector_count,
            });
        }
    }

    let batch_size = options.batch_size.max(1);
    let mut vectors = 0;
    let mut batches = 0;
    for batch in records.chunks(batch_size) {
        vectors += index.upsert(batch).await?;
        batches += 1;
        debug!(index = index.name(), batch = batches, upserted = vectors, "Batch upserted");
    }

    info!(index = index.name(), vectors, batches, "Index populated");
    Ok(PopulateOutcome::Upserted { vectors, batches })
}
