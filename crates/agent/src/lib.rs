//! The docsgpt agent: everything between a question and an answer.
//!
//! The pipeline follows a **Retrieve → Assemble → Generate** cycle:
//!
//! 1. **Embed** the question with the configured embedding model
//! 2. **Retrieve** the nearest chunk ids from the vector index
//! 3. **Assemble** a prompt from those chunks under a token budget
//! 4. **Generate** the answer with the chat model
//!
//! Index population ([`populate_index`]) runs once beforehand to load
//! precomputed embeddings.

pub mod context;
pub mod indexing;
pub mod patterns;

pub use context::{
    AssembledPrompt, AssemblyError, AssemblyInput, AssemblyMetadata, CharEstimateCounter,
    PromptAssembler, TiktokenCounter,
};
pub use indexing::{PopulateOptions, PopulateOutcome, populate_index};
pub use patterns::{RagAgent, RagAnswer, RagSettings};
