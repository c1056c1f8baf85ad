//! Prompt assembly under a token budget.
//!
//! Builds a single user prompt from three parts:
//!
//! 1. **Introduction**: a fixed instruction sentence, always present
//! 2. **Document sections**: retrieved chunks in ranked order, each wrapped
//!    in a fixed delimiter template
//! 3. **Question suffix**: the user's question, always present
//!
//! Sections are added one at a time. Before each append, the assembler
//! counts `message + next_section + question_suffix`; the first section that
//! would push the count over budget stops assembly, and every lower-ranked
//! section is dropped with it. Sections are never truncated, skipped over,
//! or reordered, so the included set is always a prefix of the ranking.
//!
//! # Determinism
//!
//! Assembly is a pure fold over its inputs: identical matches, corpus,
//! counter, and budget always produce byte-identical prompts.

use std::fmt;

use docsgpt_core::corpus::{ChunkId, CorpusLookup};
use docsgpt_core::error::{CorpusError, TokenizerError};
use docsgpt_core::index::RankedMatch;
use docsgpt_core::token::TokenCounter;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The instruction sentence placed before any document section.
pub const DEFAULT_INTRODUCTION: &str = docsgpt_config::DEFAULT_INTRODUCTION;

/// Wrap one chunk's text in the section delimiter template.
pub fn format_section(text: &str) -> String {
    format!("\n\nDocument section:\n\"\"\"\n{text}\n\"\"\"")
}

/// The question suffix closing every prompt.
pub fn format_question(query: &str) -> String {
    format!("\n\nQuestion: {query}")
}

// ── Types ─────────────────────────────────────────────────────────────────

/// All inputs for one assembly.
pub struct AssemblyInput<'a> {
    /// The user's question. Must contain non-whitespace text.
    pub query: &'a str,
    /// Retrieval results, most relevant first. Only the id order is used.
    pub ranked_matches: &'a [RankedMatch],
    /// Resolves chunk ids to text.
    pub corpus: &'a dyn CorpusLookup,
    /// Measures candidate prompts.
    pub token_counter: &'a dyn TokenCounter,
    /// Maximum token count of the prompt, in `model` units.
    pub budget: usize,
    /// Names the counting scheme passed to `token_counter`.
    pub model: &'a str,
}

/// An assembled prompt with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledPrompt {
    pub prompt: String,
    pub metadata: AssemblyMetadata,
}

/// What made it into the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Token count of the final prompt.
    pub total_tokens: usize,
    /// Configured token budget.
    pub budget: usize,
    /// Budget utilization percentage. Exceeds 100 only for an oversized
    /// minimal prompt.
    pub utilization_pct: f32,
    /// Ids of the included sections, in ranked order.
    pub included: Vec<ChunkId>,
    /// Number of candidate sections offered.
    pub sections_total: usize,
}

impl AssemblyMetadata {
    pub fn sections_excluded(&self) -> usize {
        self.sections_total - self.included.len()
    }
}

/// Errors from prompt assembly.
#[derive(Debug, Clone)]
pub enum AssemblyError {
    /// The budget is zero.
    InvalidBudget,
    /// The question is empty or whitespace.
    EmptyQuery,
    /// A ranked id has no corpus entry: the index and corpus are out of sync.
    Lookup(CorpusError),
    /// The token counter failed.
    Tokenizer(TokenizerError),
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBudget => write!(f, "Token budget must be positive"),
            Self::EmptyQuery => write!(f, "Question must not be empty"),
            Self::Lookup(e) => write!(f, "Corpus lookup failed: {e}"),
            Self::Tokenizer(e) => write!(f, "Token counting failed: {e}"),
        }
    }
}

impl std::error::Error for AssemblyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lookup(e) => Some(e),
            Self::Tokenizer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CorpusError> for AssemblyError {
    fn from(e: CorpusError) -> Self {
        Self::Lookup(e)
    }
}

impl From<TokenizerError> for AssemblyError {
    fn from(e: TokenizerError) -> Self {
        Self::Tokenizer(e)
    }
}

impl From<AssemblyError> for docsgpt_core::Error {
    fn from(e: AssemblyError) -> Self {
        match e {
            AssemblyError::InvalidBudget => docsgpt_core::Error::Config {
                message: e.to_string(),
            },
            AssemblyError::EmptyQuery => docsgpt_core::Error::InvalidInput(e.to_string()),
            AssemblyError::Lookup(e) => docsgpt_core::Error::Corpus(e),
            AssemblyError::Tokenizer(e) => docsgpt_core::Error::Tokenizer(e),
        }
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The prompt assembler. Stateless; create one and reuse it.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    introduction: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::with_default_introduction()
    }
}

impl PromptAssembler {
    pub fn new(introduction: impl Into<String>) -> Self {
        Self {
            introduction: introduction.into(),
        }
    }

    pub fn with_default_introduction() -> Self {
        Self::new(DEFAULT_INTRODUCTION)
    }

    pub fn introduction(&self) -> &str {
        &self.introduction
    }

    /// Assemble the prompt.
    ///
    /// # Algorithm
    ///
    /// 1. Reject a zero budget or empty question before any other work
    /// 2. Resolve every ranked id; any miss fails the whole assembly
    /// 3. Starting from the introduction, append sections while
    ///    `tokens(message + section + question) <= budget`; stop at the first
    ///    section that does not fit
    /// 4. Return `message + question`, even when that alone is over budget
    pub fn assemble(&self, input: &AssemblyInput<'_>) -> Result<AssembledPrompt, AssemblyError> {
        if input.budget == 0 {
            return Err(AssemblyError::InvalidBudget);
        }
        if input.query.trim().is_empty() {
            return Err(AssemblyError::EmptyQuery);
        }

        let texts = input
            .ranked_matches
            .iter()
            .map(|m| input.corpus.text(m.id).map(|text| (m.id, text)))
            .collect::<Result<Vec<_>, _>>()?;

        let question = format_question(input.query);
        let mut message = self.introduction.clone();
        let mut included = Vec::new();
        let mut total_tokens = None;

        for (id, text) in texts {
            let section = format_section(text);
            let candidate = format!("{message}{section}{question}");
            let tokens = input.token_counter.count_tokens(&candidate, input.model)?;
            if tokens > input.budget {
                debug!(chunk = id, tokens, budget = input.budget, "Section does not fit, stopping");
                break;
            }
            message.push_str(&section);
            included.push(id);
            total_tokens = Some(tokens);
        }

        message.push_str(&question);
        let total_tokens = match total_tokens {
            Some(tokens) => tokens,
            None => input.token_counter.count_tokens(&message, input.model)?,
        };

        debug!(
            included = included.len(),
            candidates = input.ranked_matches.len(),
            total_tokens,
            budget = input.budget,
            "Prompt assembled"
        );

        Ok(AssembledPrompt {
            prompt: message,
            metadata: AssemblyMetadata {
                total_tokens,
                budget: input.budget,
                utilization_pct: (total_tokens as f32 / input.budget as f32) * 100.0,
                included,
                sections_total: input.ranked_matches.len(),
            },
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
