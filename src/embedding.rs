//! Embedding collaborator trait and OpenAI-compatible implementation.
//!
//! One [`Embedder`] instance is handed to both the indexer and the
//! retriever, so index-time and query-time embeddings always come from
//! the same model. Implementations translate `embed` calls into the
//! `/embeddings` endpoint of any OpenAI-compatible runtime (the default
//! deployment targets a local Ollama instance).

use std::sync::Arc;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_trait::async_trait;

use crate::config::AssistantConfig;
use crate::error::AgentError;

/// Trait for embedding backends.
///
/// Implementations must produce fixed-dimension vectors; mixing vectors
/// from different models makes similarity scores meaningless, which is
/// why the model name travels with the implementation and is recorded
/// in the persisted index.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding model identifier (e.g. `"nomic-embed-text"`).
    fn model_name(&self) -> &str;

    /// Computes the embedding vector for a single text.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] on transport failures or an
    /// empty response.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates a new embedder from the assistant configuration.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base);

        Self {
            client: Client::with_config(openai_config),
            model: config.embedding_model.clone(),
        }
    }
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("client", &"<async-openai::Client>")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::String(text.to_string()),
            ..Default::default()
        };

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: format!(
                    "embedding request failed (is the model runtime reachable?): {e}"
                ),
                status: None,
            })?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AgentError::ApiRequest {
                message: "embedding response contained no vectors".to_string(),
                status: None,
            })
    }
}

/// Creates an [`Embedder`] from the assistant configuration.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_embedder(config: &AssistantConfig) -> Result<Arc<dyn Embedder>, AgentError> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(config))),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AssistantConfig {
        AssistantConfig::builder()
            .api_key("test")
            .embedding_model("nomic-embed-text")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_embedder_reports_model_name() {
        let embedder = OpenAiEmbedder::new(&test_config());
        assert_eq!(embedder.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_create_openai_embedder() {
        let embedder = create_embedder(&test_config());
        assert!(embedder.is_ok());
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = AssistantConfig::builder()
            .provider("unknown")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(create_embedder(&config).is_err());
    }
}
