//! RAG pattern: Retrieval-Augmented Generation.
//!
//! # Flow
//!
//! 1. Receive the user question
//! 2. Embed it with the embedding model
//! 3. Query the vector index for the `top_n` nearest chunks
//! 4. Assemble a prompt from those chunks under the token budget
//! 5. Send `[system, user]` to the chat model and return its answer
//!
//! The corpus, index, provider, and token counter are injected; the agent
//! holds no global state and can be shared across requests.

use std::sync::Arc;

use docsgpt_config::AppConfig;
use docsgpt_core::corpus::CorpusLookup;
use docsgpt_core::error::ProviderError;
use docsgpt_core::index::{RankedMatch, VectorIndex};
use docsgpt_core::message::Message;
use docsgpt_core::provider::{EmbeddingRequest, Provider, ProviderRequest, Usage};
use docsgpt_core::token::TokenCounter;
use serde::Serialize;
use tracing::{debug, info};

use crate::context::{AssembledPrompt, AssemblyInput, AssemblyMetadata, PromptAssembler};

/// Model and retrieval knobs for one agent.
#[derive(Debug, Clone)]
pub struct RagSettings {
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub top_n: usize,
    pub token_budget: usize,
    pub system_message: String,
    pub introduction: String,
}

impl RagSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            chat_model: config.openai.chat_model.clone(),
            embedding_model: config.openai.embedding_model.clone(),
            temperature: config.openai.temperature,
            top_n: config.retrieval.top_n,
            token_budget: config.retrieval.token_budget,
            system_message: config.prompt.system_message.clone(),
            introduction: config.prompt.introduction.clone(),
        }
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// The RAG orchestrator.
pub struct RagAgent {
    provider: Arc<dyn Provider>,
    index: Arc<dyn VectorIndex>,
    corpus: Arc<dyn CorpusLookup>,
    token_counter: Arc<dyn TokenCounter>,
    assembler: PromptAssembler,
    settings: RagSettings,
}

/// Result of answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    /// The assembled user prompt sent to the chat model.
    pub prompt: String,
    /// Ranked matches as returned by the index.
    pub matches: Vec<RankedMatch>,
    pub metadata: AssemblyMetadata,
    pub usage: Option<Usage>,
}

impl RagAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        index: Arc<dyn VectorIndex>,
        corpus: Arc<dyn CorpusLookup>,
        token_counter: Arc<dyn TokenCounter>,
        settings: RagSettings,
    ) -> Self {
        Self {
            provider,
            index,
            corpus,
            token_counter,
            assembler: PromptAssembler::new(settings.introduction.clone()),
            settings,
        }
    }

    pub fn settings(&self) -> &RagSettings {
        &self.settings
    }

    /// Embed `query` and return the index's ranked matches.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RankedMatch>, docsgpt_core::Error> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.settings.embedding_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await?;

        let embedding = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse("No embedding for query".into()))?;

        let matches = self.index.query(&embedding, self.settings.top_n).await?;
        debug!(
            index = self.index.name(),
            matches = matches.len(),
            top_n = self.settings.top_n,
            "RAG: retrieved matches"
        );
        Ok(matches)
    }

    /// Assemble the user prompt for `query` from `matches`.
    pub fn build_prompt(
        &self,
        query: &str,
        matches: &[RankedMatch],
    ) -> Result<AssembledPrompt, docsgpt_core::Error> {
        let assembled = self.assembler.assemble(&AssemblyInput {
            query,
            ranked_matches: matches,
            corpus: self.corpus.as_ref(),
            token_counter: self.token_counter.as_ref(),
            budget: self.settings.token_budget,
            model: &self.settings.chat_model,
        })?;
        Ok(assembled)
    }

    /// Answer `query` end to end.
    pub async fn ask(&self, query: &str) -> Result<RagAnswer, docsgpt_core::Error> {
        if query.trim().is_empty() {
            return Err(docsgpt_core::Error::InvalidInput(
                "Question must not be empty".into(),
            ));
        }

        info!(model = %self.settings.chat_model, "RAG: starting retrieval");
        let matches = self.retrieve(query).await?;
        let assembled = self.build_prompt(query, &matches)?;

        info!(
            sections = assembled.metadata.included.len(),
            excluded = assembled.metadata.sections_excluded(),
            tokens = assembled.metadata.total_tokens,
            budget = assembled.metadata.budget,
            "RAG: prompt assembled"
        );

        let request = ProviderRequest {
            model: self.settings.chat_model.clone(),
            messages: vec![
                Message::system(&self.settings.system_message),
                Message::user(&assembled.prompt),
            ],
            temperature: self.settings.temperature,
            max_tokens: None,
        };

        let response = self.provider.complete(request).await?;
        let answer = response.message.content;

        info!(answer_len = answer.len(), "RAG: response generated");

        Ok(RagAnswer {
            question: query.to_string(),
            answer,
            prompt: assembled.prompt,
            matches,
            metadata: assembled.metadata,
            usage: response.usage,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
