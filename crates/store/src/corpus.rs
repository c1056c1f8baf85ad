//! Chunk text corpus loaded from a CSV file.
//!
//! The file has a header row with at least `id` and `text` columns; any
//! other columns (a leading unnamed index, an `embedding` column) are
//! ignored. The whole file is read once at startup and served from memory.

use std::collections::HashMap;
use std::path::Path;

use docsgpt_core::corpus::{ChunkId, CorpusLookup, DocumentChunk};
use docsgpt_core::error::CorpusError;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct TextRow {
    id: String,
    text: String,
}

/// Read-only id-to-text map.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    chunks: HashMap<ChunkId, String>,
}

impl CorpusStore {
    /// Load the corpus from `path`. Duplicate ids and unparsable rows are
    /// errors; an empty file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let mut reader = csv::Reader::from_path(path).map_err(|e| CorpusError::Read {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let mut chunks = HashMap::new();
        for (i, row) in reader.deserialize::<TextRow>().enumerate() {
            // Row numbers are 1-based and skip the header.
            let row_number = i + 2;
            let row = row.map_err(|e| CorpusError::MalformedRow {
                path: display.clone(),
                row: row_number,
                reason: e.to_string(),
            })?;
            let id = parse_chunk_id(&row.id).ok_or_else(|| CorpusError::MalformedRow {
                path: display.clone(),
                row: row_number,
                reason: format!("invalid id '{}'", row.id),
            })?;
            if chunks.insert(id, row.text).is_some() {
                return Err(CorpusError::DuplicateId { path: display, id });
            }
        }

        debug!(path = %path.display(), chunks = chunks.len(), "Corpus loaded");
        Ok(Self { chunks })
    }

    pub fn from_chunks(chunks: impl IntoIterator<Item = DocumentChunk>) -> Self {
        Self {
            chunks: chunks.into_iter().map(|c| (c.id, c.text)).collect(),
        }
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id)
    }
}

impl CorpusLookup for CorpusStore {
    fn text(&self, id: ChunkId) -> Result<&str, CorpusError> {
        self.chunks
            .get(&id)
            .map(String::as_str)
            .ok_or(CorpusError::NotFound { id })
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Parse an id column value. Accepts integral floats such as `12.0`, which
/// dataframe exports sometimes produce.
pub(crate) fn parse_chunk_id(raw: &str) -> Option<ChunkId> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<ChunkId>() {
        return Some(id);
    }
    let float: f64 = raw.parse().ok()?;
    (float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64).then_some(float as ChunkId)
}
