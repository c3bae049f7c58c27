//! Grounded answer synthesis over retrieved document chunks.
//!
//! The synthesizer turns a question plus retrieved chunks into a single
//! LLM call: a grounding system prompt, the chunks as a bounded context
//! block, and the question. The prompt instructs the model to answer
//! only from the supplied context and to emit a fixed marker when the
//! context does not contain the answer.

use tracing::debug;

use crate::agent::message::{self, ChatRequest};
use crate::agent::prompt::{self, GROUNDING_SYSTEM_PROMPT};
use crate::agent::provider::LlmProvider;
use crate::config::AssistantConfig;
use crate::error::AgentError;
use crate::retrieval::ScoredChunk;

/// Marker the grounding prompt mandates when the context lacks the answer.
pub const UNKNOWN_MARKER: &str = "I don't know based on the provided context.";

/// Synthesizes grounded answers from retrieved chunks.
#[derive(Debug, Clone)]
pub struct AnswerSynthesizer {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl AnswerSynthesizer {
    /// Creates a synthesizer from assistant configuration with the
    /// default grounding prompt.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            model: config.chat_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: GROUNDING_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replaces the grounding system prompt (template override).
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Synthesizes an answer to `question` grounded in `context_chunks`.
    ///
    /// An empty chunk set short-circuits to [`UNKNOWN_MARKER`] without
    /// calling the model.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the completion request fails.
    pub async fn synthesize(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        context_chunks: &[ScoredChunk],
    ) -> Result<String, AgentError> {
        if context_chunks.is_empty() {
            debug!(question, "no context retrieved, skipping synthesis");
            return Ok(UNKNOWN_MARKER.to_string());
        }

        debug!(
            question,
            chunks = context_chunks.len(),
            "synthesizing grounded answer"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                message::system_message(&self.system_prompt),
                message::user_message(&prompt::build_grounding_prompt(question, context_chunks)),
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let response = provider.chat(&request).await?;
        Ok(response.content.trim().to_string())
    }
}
