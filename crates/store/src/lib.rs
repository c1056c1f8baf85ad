//! Local data for docsgpt: the chunk text corpus, precomputed embeddings,
//! and an in-memory vector index for offline runs.

pub mod corpus;
pub mod embeddings;
pub mod in_memory;
pub mod vector;

pub use corpus::CorpusStore;
pub use embeddings::load_embeddings;
pub use in_memory::InMemoryIndex;
pub use vector::cosine_similarity;
