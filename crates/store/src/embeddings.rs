//! Precomputed embeddings loaded from a CSV file.
//!
//! Each row carries an `id` and an `embedding` column holding the vector as
//! a bracketed list literal, e.g. `"[0.0123, -0.0456, ...]"`.

use std::path::Path;

use docsgpt_core::error::CorpusError;
use docsgpt_core::index::VectorRecord;
use serde::Deserialize;
use tracing::debug;

use crate::corpus::parse_chunk_id;

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    id: String,
    embedding: String,
}

/// Load every row of the embeddings file, in file order.
pub fn load_embeddings(path: impl AsRef<Path>) -> Result<Vec<VectorRecord>, CorpusError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|e| CorpusError::Read {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<EmbeddingRow>().enumerate() {
        let row_number = i + 2;
        let malformed = |reason: String| CorpusError::MalformedRow {
            path: display.clone(),
            row: row_number,
            reason,
        };
        let row = row.map_err(|e| malformed(e.to_string()))?;
        let id = parse_chunk_id(&row.id).ok_or_else(|| malformed(format!("invalid id '{}'", row.id)))?;
        let values = parse_vector(&row.embedding).map_err(malformed)?;
        records.push(VectorRecord { id, values });
    }

    debug!(path = %path.display(), vectors = records.len(), "Embeddings loaded");
    Ok(records)
}

fn parse_vector(raw: &str) -> Result<Vec<f32>, String> {
    let values: Vec<f32> =
        serde_json::from_str(raw.trim()).map_err(|e| format!("invalid embedding: {e}"))?;
    if values.is_empty() {
        return Err("empty embedding".into());
    }
    Ok(values)
}
