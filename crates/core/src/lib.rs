//! # docsgpt Core
//!
//! Domain types, traits, and error definitions for the docsgpt
//! retrieval-augmented question answering service. This crate has
//! **zero framework dependencies**: it defines the domain model that the
//! other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates:
//! - [`Provider`]: chat completion and embeddings (`docsgpt-providers`)
//! - [`VectorIndex`]: hosted or in-memory vector search (`docsgpt-providers`, `docsgpt-store`)
//! - [`CorpusLookup`]: chunk id to text (`docsgpt-store`)
//! - [`TokenCounter`]: text to token count (`docsgpt-agent`)

pub mod corpus;
pub mod error;
pub mod index;
pub mod message;
pub mod provider;
pub mod token;

// Re-export key types at crate root for ergonomics
pub use corpus::{ChunkId, CorpusLookup, DocumentChunk};
pub use error::{CorpusError, Error, IndexError, ProviderError, Result, TokenizerError};
pub use index::{IndexStats, RankedMatch, VectorIndex, VectorRecord};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use token::TokenCounter;
