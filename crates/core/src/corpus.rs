//! Corpus types: the document chunks retrieval points back into.

use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// Identifier of a document chunk, unique within a corpus.
pub type ChunkId = u64;

/// One retrievable unit of corpus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub text: String,
}

/// Read-only capability resolving a chunk id to its text.
///
/// Lookups are expected to be local and cheap; the prompt assembler calls
/// this once per ranked match.
pub trait CorpusLookup: Send + Sync {
    /// Return the text for `id`, or `CorpusError::NotFound`.
    fn text(&self, id: ChunkId) -> Result<&str, CorpusError>;

    /// Number of chunks held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CorpusLookup for std::collections::HashMap<ChunkId, String> {
    fn text(&self, id: ChunkId) -> Result<&str, CorpusError> {
        self.get(&id)
            .map(String::as_str)
            .ok_or(CorpusError::NotFound { id })
    }

    fn len(&self) -> usize {
        std::collections::HashMap::len(self)
    }
}
