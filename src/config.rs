//! Assistant configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! All process-wide constants (server addresses, model names, index path)
//! live here and are passed into component constructors, so multiple
//! independent sessions can coexist in one process.

use std::path::PathBuf;
use std::time::Duration;

use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::error::AgentError;

/// Default OpenAI-compatible API base (local Ollama runtime).
const DEFAULT_API_BASE: &str = "http://localhost:11434/v1";
/// Default API key. Local runtimes accept any non-empty key.
const DEFAULT_API_KEY: &str = "ollama";
/// Default chat model for routing and answer synthesis.
const DEFAULT_CHAT_MODEL: &str = "qwen3:1.7b";
/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
/// Default external tool-provider base URL.
const DEFAULT_TOOL_SERVER_URL: &str = "http://127.0.0.1:8000";
/// Default persisted index directory.
const DEFAULT_INDEX_DIR: &str = "./docent_index";
/// Default number of chunks retrieved per document query.
const DEFAULT_TOP_K: usize = 3;
/// Default maximum decision/invoke cycles per user message.
const DEFAULT_MAX_ITERATIONS: usize = 3;
/// Default sampling temperature. Near-zero for reproducible routing
/// and grounded answers.
const DEFAULT_TEMPERATURE: f32 = 0.1;
/// Default maximum tokens per model response.
const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Default per-invocation capability timeout in seconds.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Configuration for an assistant session.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// OpenAI-compatible API base URL for chat and embeddings.
    pub api_base: String,
    /// Chat model used for routing decisions and grounded answers.
    pub chat_model: String,
    /// Embedding model used at index build time and query time.
    pub embedding_model: String,
    /// Base URL of the external tool-provider HTTP service.
    pub tool_server_url: String,
    /// Directory holding the persisted vector index.
    pub index_dir: PathBuf,
    /// Maximum chunk length in grapheme clusters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in grapheme clusters.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per document query.
    pub top_k: usize,
    /// Maximum decision/invoke cycles per user message.
    pub max_iterations: usize,
    /// Sampling temperature for all model calls.
    pub temperature: f32,
    /// Maximum tokens per model response.
    pub max_tokens: u32,
    /// Timeout applied to each capability invocation.
    pub tool_timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl AssistantConfig {
    /// Creates a new builder for `AssistantConfig`.
    #[must_use]
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if validation fails.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AssistantConfig`].
#[derive(Debug, Clone, Default)]
pub struct AssistantConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    api_base: Option<String>,
    chat_model: Option<String>,
    embedding_model: Option<String>,
    tool_server_url: Option<String>,
    index_dir: Option<PathBuf>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    max_iterations: Option<usize>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    tool_timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl AssistantConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("DOCENT_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("DOCENT_API_KEY"))
                .ok();
        }
        if self.api_base.is_none() {
            self.api_base = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("DOCENT_API_BASE"))
                .ok();
        }
        if self.chat_model.is_none() {
            self.chat_model = std::env::var("DOCENT_CHAT_MODEL").ok();
        }
        if self.embedding_model.is_none() {
            self.embedding_model = std::env::var("DOCENT_EMBEDDING_MODEL").ok();
        }
        if self.tool_server_url.is_none() {
            self.tool_server_url = std::env::var("DOCENT_TOOL_SERVER").ok();
        }
        if self.index_dir.is_none() {
            self.index_dir = std::env::var("DOCENT_INDEX_DIR").ok().map(PathBuf::from);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("DOCENT_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the OpenAI-compatible API base URL.
    #[must_use]
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = Some(url.into());
        self
    }

    /// Sets the chat model.
    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Sets the external tool-provider base URL.
    #[must_use]
    pub fn tool_server_url(mut self, url: impl Into<String>) -> Self {
        self.tool_server_url = Some(url.into());
        self
    }

    /// Sets the persisted index directory.
    #[must_use]
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Sets the maximum chunk length in grapheme clusters.
    #[must_use]
    pub const fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = Some(n);
        self
    }

    /// Sets the overlap between consecutive chunks.
    #[must_use]
    pub const fn chunk_overlap(mut self, n: usize) -> Self {
        self.chunk_overlap = Some(n);
        self
    }

    /// Sets the number of chunks retrieved per document query.
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Sets the iteration budget per user message.
    #[must_use]
    pub const fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the maximum tokens per model response.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the per-invocation capability timeout.
    #[must_use]
    pub const fn tool_timeout(mut self, duration: Duration) -> Self {
        self.tool_timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AssistantConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if the chunk geometry is
    /// invalid (size must exceed overlap) or the iteration budget or
    /// top-k is zero.
    pub fn build(self) -> Result<AssistantConfig, AgentError> {
        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        let chunk_overlap = self.chunk_overlap.unwrap_or(DEFAULT_OVERLAP);
        if chunk_size <= chunk_overlap {
            return Err(AgentError::InvalidConfig {
                message: format!(
                    "chunk_size ({chunk_size}) must be greater than chunk_overlap ({chunk_overlap})"
                ),
            });
        }

        let max_iterations = self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(AgentError::InvalidConfig {
                message: "max_iterations must be at least 1".to_string(),
            });
        }

        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(AgentError::InvalidConfig {
                message: "top_k must be at least 1".to_string(),
            });
        }

        Ok(AssistantConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key: self.api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            chat_model: self
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            tool_server_url: self
                .tool_server_url
                .unwrap_or_else(|| DEFAULT_TOOL_SERVER_URL.to_string()),
            index_dir: self
                .index_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_DIR)),
            chunk_size,
            chunk_overlap,
            top_k,
            max_iterations,
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            tool_timeout: self
                .tool_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}
