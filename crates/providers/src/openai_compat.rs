//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI and any endpoint exposing the same
//! `/chat/completions` and `/embeddings` routes (Azure proxies, vLLM,
//! Ollama, OpenRouter).
//!
//! Supports:
//! - Chat completions (non-streaming)
//! - Embeddings
//! - Health checks via the model listing

use std::time::Duration;

use async_trait::async_trait;
use docsgpt_core::error::ProviderError;
use docsgpt_core::message::{Message, Role};
use docsgpt_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible chat and embedding provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(
            "openai",
            "https://api.openai.com/v1",
            api_key,
            Duration::from_secs(120),
        )
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: Some(m.content.clone()),
            })
            .collect()
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            200 => Ok(response),
            429 => Err(ProviderError::RateLimited {
                retry_after_secs: retry_after(&response).unwrap_or(5),
            }),
            401 | 403 => Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            )),
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                warn!(provider = %self.name, status, body = %error_body, "Provider returned error");
                Err(ProviderError::ApiError {
                    status_code: status,
                    message: error_body,
                })
            }
        }
    }
}

fn retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[async_trait]
impl docsgpt_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self.post_json(&url, &body).await?;

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        api_response.into_provider_response()
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        if request.inputs.is_empty() {
            return Ok(EmbeddingResponse {
                embeddings: Vec::new(),
                model: request.model,
                usage: None,
            });
        }

        let url = format!("{}/embeddings", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "input": request.inputs,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %request.model,
            count = request.inputs.len(),
            "Sending embedding request"
        );

        let response = self.post_json(&url, &body).await?;

        let api_resp: EmbeddingApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse embedding response: {e}"),
            })?;

        api_resp.into_embedding_response(request.inputs.len())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Chat API types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

impl ApiResponse {
    fn into_provider_response(self) -> Result<ProviderResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse("No choices in response".into()))?;

        let role = match choice.message.role.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            _ => Role::Assistant,
        };

        Ok(ProviderResponse {
            message: Message {
                role,
                content: choice.message.content.unwrap_or_default(),
            },
            usage: self.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: self.model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// --- Embedding API types ---

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
    model: String,
    usage: Option<EmbeddingApiUsage>,
}

impl EmbeddingApiResponse {
    fn into_embedding_response(
        mut self,
        expected: usize,
    ) -> Result<EmbeddingResponse, ProviderError> {
        if self.data.len() != expected {
            return Err(ProviderError::EmptyResponse(format!(
                "Provider returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        self.data.sort_by_key(|d| d.index);

        Ok(EmbeddingResponse {
            embeddings: self.data.into_iter().map(|d| d.embedding).collect(),
            model: self.model,
            usage: self.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: 0,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}
