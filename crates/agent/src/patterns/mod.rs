//! Orchestration patterns.
//!
//! **RAG**: embed the question, retrieve ranked chunks, assemble a budgeted
//! prompt, and generate an answer grounded in the retrieved sections.

pub mod rag;

pub use rag::{RagAgent, RagAnswer, RagSettings};

#[cfg(test)]
pub(crate) mod test_helpers;
