//! Shared wiring: config → provider, index, corpus → agent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use docsgpt_agent::{
    PopulateOptions, PopulateOutcome, RagAgent, RagSettings, TiktokenCounter, populate_index,
};
use docsgpt_config::{AppConfig, ConfigError};
use docsgpt_core::VectorIndex;
use docsgpt_providers::{IndexSpec, OpenAiCompatProvider, PineconeClient};
use docsgpt_store::{CorpusStore, InMemoryIndex, load_embeddings};
use tracing::info;

pub fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::load().context("Failed to load config")
}

pub fn openai_provider(config: &AppConfig) -> anyhow::Result<OpenAiCompatProvider> {
    let api_key = config
        .openai
        .api_key
        .as_deref()
        .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))?;
    Ok(OpenAiCompatProvider::new(
        "openai",
        &config.openai.api_url,
        api_key,
        Duration::from_secs(config.openai.timeout_secs),
    )?)
}

pub fn pinecone_client(config: &AppConfig) -> anyhow::Result<PineconeClient> {
    let credentials = config.require_credentials()?;
    Ok(PineconeClient::new(
        credentials.pinecone_key,
        credentials.pinecone_environment,
        Duration::from_secs(config.pinecone.timeout_secs),
    )?)
}

pub fn index_spec(config: &AppConfig) -> IndexSpec {
    IndexSpec {
        name: config.pinecone.index_name.clone(),
        dimension: config.pinecone.dimension,
        metric: config.pinecone.metric.clone(),
        pod_type: config.pinecone.pod_type.clone(),
    }
}

/// Connect to the configured index (creating it when missing) or build an
/// in-memory one, then make sure it holds the precomputed embeddings.
pub async fn open_index(
    config: &AppConfig,
    offline: bool,
    force: bool,
) -> anyhow::Result<(Arc<dyn VectorIndex>, PopulateOutcome)> {
    let index: Arc<dyn VectorIndex> = if offline {
        info!(dimension = config.pinecone.dimension, "Using in-memory index");
        Arc::new(InMemoryIndex::new(
            config.pinecone.index_name.clone(),
            config.pinecone.dimension,
        ))
    } else {
        let client = pinecone_client(config)?;
        let index = client
            .ensure_index(&index_spec(config))
            .await
            .with_context(|| format!("Failed to open index '{}'", config.pinecone.index_name))?;
        Arc::new(index)
    };

    let path = &config.corpus.embeddings_path;
    let records = load_embeddings(path)
        .with_context(|| format!("Failed to load embeddings from {}", path.display()))?;

    let outcome = populate_index(
        index.as_ref(),
        &records,
        PopulateOptions {
            batch_size: config.pinecone.upsert_batch_size,
            force,
        },
    )
    .await
    .context("Failed to populate index")?;

    Ok((index, outcome))
}

/// Build the full question-answering pipeline.
pub async fn build_agent(config: &AppConfig, offline: bool) -> anyhow::Result<Arc<RagAgent>> {
    if !offline {
        config.require_credentials()?;
    }
    let provider = openai_provider(config)?;

    let path = &config.corpus.text_path;
    let corpus = CorpusStore::load(path)
        .with_context(|| format!("Failed to load corpus from {}", path.display()))?;

    let (index, _) = open_index(config, offline, false).await?;

    Ok(Arc::new(RagAgent::new(
        Arc::new(provider),
        index,
        Arc::new(corpus),
        Arc::new(TiktokenCounter::new()),
        RagSettings::from_config(config),
    )))
}
