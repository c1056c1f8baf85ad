//! Configuration loading, validation, and management for docsgpt.
//!
//! Loads configuration from `~/.docsgpt/config.toml` with environment
//! variable overrides. A `.env` file in the working directory is read first,
//! so keys kept there behave like exported variables. Validates all settings
//! at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.docsgpt/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat completion and embedding service
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Hosted vector index
    #[serde(default)]
    pub pinecone: PineconeConfig,

    /// Corpus CSV files
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Retrieval and prompt budget
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Prompt wording
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_url")]
    pub api_url: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_openai_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Deployment environment, e.g. `us-west1-gcp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// One of `cosine`, `euclidean`, `dotproduct`
    #[serde(default = "default_metric")]
    pub metric: String,

    #[serde(default = "default_pod_type")]
    pub pod_type: String,

    #[serde(default = "default_batch_size")]
    pub upsert_batch_size: usize,

    /// Per-request timeout for controller and data-plane calls
    #[serde(default = "default_pinecone_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_index_name() -> String {
    "visionos-docs-2023-07-10".into()
}
fn default_dimension() -> usize {
    1536
}
fn default_metric() -> String {
    "cosine".into()
}
fn default_pod_type() -> String {
    "p1".into()
}
fn default_batch_size() -> usize {
    100
}
fn default_pinecone_timeout_secs() -> u64 {
    30
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            environment: None,
            index_name: default_index_name(),
            dimension: default_dimension(),
            metric: default_metric(),
            pod_type: default_pod_type(),
            upsert_batch_size: default_batch_size(),
            timeout_secs: default_pinecone_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &redact(&self.api_key))
            .field("environment", &self.environment)
            .field("index_name", &self.index_name)
            .field("dimension", &self.dimension)
            .field("metric", &self.metric)
            .field("pod_type", &self.pod_type)
            .field("upsert_batch_size", &self.upsert_batch_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// CSV with `id,text` columns
    #[serde(default = "default_text_path")]
    pub text_path: PathBuf,

    /// CSV with `id,embedding` columns, embedding as a string-encoded list
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,
}

fn default_text_path() -> PathBuf {
    PathBuf::from("visionos_docs_2023_07_10_text.csv")
}
fn default_embeddings_path() -> PathBuf {
    PathBuf::from("visionos_docs_2023_07_10_embedding.csv")
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            text_path: default_text_path(),
            embeddings_path: default_embeddings_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest neighbours requested from the index
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Prompt budget in tokens of the chat model
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,
}

fn default_top_n() -> usize {
    100
}
fn default_token_budget() -> usize {
    // 4096 context window minus room for the answer
    4096 - 500
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            token_budget: default_token_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_introduction")]
    pub introduction: String,

    #[serde(default = "default_system_message")]
    pub system_message: String,
}

/// Instruction placed before the retrieved document sections.
pub const DEFAULT_INTRODUCTION: &str = "Use the below articles on Apple visionOS to answer the subsequent question. If the answer cannot be found in the articles, write \"I could not find an answer.\"";

fn default_introduction() -> String {
    DEFAULT_INTRODUCTION.into()
}
fn default_system_message() -> String {
    "You answer questions about Apple VisionOS.".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            introduction: default_introduction(),
            system_message: default_system_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Question answered once at startup and shown on the index page
    #[serde(default = "default_showcase_question")]
    pub showcase_question: String,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_showcase_question() -> String {
    "How to add a button to open full immersive space using swiftUI with visionOS?".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            showcase_question: default_showcase_question(),
        }
    }
}

const METRICS: [&str; 3] = ["cosine", "euclidean", "dotproduct"];

impl AppConfig {
    /// Load configuration from the default path (~/.docsgpt/config.toml).
    ///
    /// Reads `.env` from the working directory first, then applies
    /// environment overrides:
    /// - `OPENAI_API_KEY`, `PINECONE_API_KEY`, `PINECONE_ENVIRONMENT`
    /// - `DOCSGPT_CHAT_MODEL`, `DOCSGPT_TEXT_CSV`, `DOCSGPT_EMBEDDINGS_CSV`
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
        }

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// API keys from the environment only fill gaps; the file wins when both
    /// are set. Model and corpus paths from the environment always win.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.openai.api_key.is_none() {
            self.openai.api_key = var("OPENAI_API_KEY").filter(|v| !v.is_empty());
        }
        if self.pinecone.api_key.is_none() {
            self.pinecone.api_key = var("PINECONE_API_KEY").filter(|v| !v.is_empty());
        }
        if self.pinecone.environment.is_none() {
            self.pinecone.environment = var("PINECONE_ENVIRONMENT").filter(|v| !v.is_empty());
        }
        if let Some(model) = var("DOCSGPT_CHAT_MODEL") {
            self.openai.chat_model = model;
        }
        if let Some(path) = var("DOCSGPT_TEXT_CSV") {
            self.corpus.text_path = PathBuf::from(path);
        }
        if let Some(path) = var("DOCSGPT_EMBEDDINGS_CSV") {
            self.corpus.embeddings_path = PathBuf::from(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docsgpt")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::ValidationError(
                "openai.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.pinecone.dimension == 0 {
            return Err(ConfigError::ValidationError(
                "pinecone.dimension must be > 0".into(),
            ));
        }
        if self.pinecone.upsert_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "pinecone.upsert_batch_size must be > 0".into(),
            ));
        }
        if !METRICS.contains(&self.pinecone.metric.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "pinecone.metric must be one of {}, got '{}'",
                METRICS.join(", "),
                self.pinecone.metric
            )));
        }
        if self.retrieval.token_budget == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.token_budget must be > 0".into(),
            ));
        }
        if self.retrieval.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_n must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Fail with the first missing credential needed to reach hosted services.
    pub fn require_credentials(&self) -> Result<Credentials<'_>, ConfigError> {
        let openai_key = self
            .openai
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))?;
        let pinecone_key = self
            .pinecone
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential("PINECONE_API_KEY"))?;
        let pinecone_environment = self
            .pinecone
            .environment
            .as_deref()
            .ok_or(ConfigError::MissingCredential("PINECONE_ENVIRONMENT"))?;
        Ok(Credentials {
            openai_key,
            pinecone_key,
            pinecone_environment,
        })
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Borrowed view of the secrets needed to reach hosted services.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub openai_key: &'a str,
    pub pinecone_key: &'a str,
    pub pinecone_environment: &'a str,
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("{0} environment variable is missing (set it or add it to .env)")]
    MissingCredential(&'static str),
}
