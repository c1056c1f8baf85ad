//! Hosted service clients for docsgpt.
//!
//! - [`OpenAiCompatProvider`] implements `docsgpt_core::Provider` for chat
//!   completions and embeddings.
//! - [`PineconeClient`] provisions indexes; [`PineconeIndex`] implements
//!   `docsgpt_core::VectorIndex` against one index's data plane.

pub mod openai_compat;
pub mod pinecone;

pub use openai_compat::OpenAiCompatProvider;
pub use pinecone::{IndexSpec, PineconeClient, PineconeIndex};
