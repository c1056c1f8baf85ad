//! Shared test helpers for orchestration tests.

use docsgpt_core::error::ProviderError;
use docsgpt_core::message::Message;
use docsgpt_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use std::sync::Mutex;

/// A mock provider with scripted chat answers and a fixed query embedding.
///
/// Each call to `complete` returns the next answer in the queue and records
/// the request. Panics if more calls are made than answers provided.
pub struct ScriptedProvider {
    answers: Mutex<Vec<String>>,
    embedding: Vec<f32>,
    requests: Mutex<Vec<ProviderRequest>>,
    embed_calls: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(answers: Vec<&str>, embedding: Vec<f32>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().rev().map(String::from).collect()),
            embedding,
            requests: Mutex::new(Vec::new()),
            embed_calls: Mutex::new(0),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop()
            .expect("ScriptedProvider: no more answers");
        Ok(make_text_response(&answer))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        *self.embed_calls.lock().unwrap() += 1;
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|_| self.embedding.clone()).collect(),
            model: request.model,
            usage: None,
        })
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
