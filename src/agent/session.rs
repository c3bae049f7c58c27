//! Conversational session: durable state plus component wiring.
//!
//! A session owns the conversation history and everything one loop run
//! needs: the provider, the capability registry, and the router prompt.
//! Construction builds or loads the vector index, so a session never
//! exists without a usable index behind its `document_qa` capability.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::client::create_provider;
use super::message::{self, ChatRequest};
use super::orchestrator::{self, LoopOutcome};
use super::prompt::{self, PromptSet};
use super::provider::LlmProvider;
use super::synthesizer::AnswerSynthesizer;
use crate::config::AssistantConfig;
use crate::embedding::create_embedder;
use crate::error::{AgentError, CommandError};
use crate::index::DocumentIndexer;
use crate::retrieval::Retriever;
use crate::tool::{DocumentQa, ToolRegistry, def_calc, def_datetime, def_weather};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    /// The user.
    User,
    /// The assistant.
    Assistant,
}

/// One durable conversation turn.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    /// Who produced the turn.
    pub role: TurnRole,
    /// Turn text.
    pub content: String,
}

/// Append-only conversation history for one session.
///
/// Only final turns live here. Intermediate decisions, observations,
/// and corrective re-prompts are loop-local and discarded when the
/// loop completes.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<ConversationTurn>,
}

impl ConversationState {
    /// Creates an empty conversation.
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// All turns, in order.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, role: TurnRole, content: &str) {
        self.turns.push(ConversationTurn {
            role,
            content: content.to_string(),
        });
    }
}

/// A conversational session over the indexed document and the
/// capability catalog.
///
/// `send` takes `&mut self`, so one message is fully processed before
/// the next is accepted. Independent sessions share only the read-only
/// index and registry.
pub struct Session {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    state: ConversationState,
    router_system: String,
    chat_model: String,
    temperature: f32,
    max_tokens: u32,
    max_iterations: usize,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("turns", &self.state.len())
            .field("capabilities", &self.registry.names())
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

impl Session {
    /// Builds a session: index (built or loaded), provider, default
    /// capability catalog, and prompts.
    ///
    /// # Errors
    ///
    /// Fails when the source document is missing, the index cannot be
    /// built or loaded, or the configuration names an unsupported
    /// provider. No session exists without a usable index.
    pub async fn new(config: &AssistantConfig, source: &Path) -> Result<Self, CommandError> {
        let embedder = create_embedder(config)?;
        let indexer = DocumentIndexer::new(
            Arc::clone(&embedder),
            config.chunk_size,
            config.chunk_overlap,
        );
        let index = Arc::new(indexer.build_or_load(source, &config.index_dir).await?);
        info!(
            chunks = index.len(),
            source = %source.display(),
            "session index ready"
        );

        let provider = create_provider(config)?;
        let prompts = PromptSet::load(config.prompt_dir.as_deref());

        let http = reqwest::Client::new();
        let mut registry = ToolRegistry::new(config.tool_timeout);
        registry.register(Arc::new(def_datetime(http.clone(), &config.tool_server_url)))?;
        registry.register(Arc::new(def_weather(http.clone(), &config.tool_server_url)))?;
        registry.register(Arc::new(def_calc(http, &config.tool_server_url)))?;
        registry.register(Arc::new(DocumentQa::new(
            Retriever::new(index, embedder),
            AnswerSynthesizer::new(config).with_system_prompt(prompts.grounding.clone()),
            Arc::clone(&provider),
            config.top_k,
        )))?;

        Ok(Self::from_parts(provider, Arc::new(registry), &prompts, config))
    }

    /// Wires a session from pre-built components.
    fn from_parts(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        prompts: &PromptSet,
        config: &AssistantConfig,
    ) -> Self {
        let router_system = prompt::build_router_prompt(&prompts.router, &registry.catalog());
        Self {
            provider,
            registry,
            state: ConversationState::new(),
            router_system,
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_iterations: config.max_iterations,
        }
    }

    /// The durable conversation so far.
    #[must_use]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// The registered capability catalog, in registration order.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Processes one user message through the decision loop.
    ///
    /// On success (final answer or budget exhaustion) exactly one user
    /// turn and one assistant turn are appended to the conversation.
    /// On provider failure nothing is appended, so the caller may retry
    /// the same message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider transport failures.
    pub async fn send(&mut self, user_message: &str) -> Result<LoopOutcome, AgentError> {
        let mut messages = vec![message::system_message(&self.router_system)];
        for turn in self.state.turns() {
            messages.push(match turn.role {
                TurnRole::User => message::user_message(&turn.content),
                TurnRole::Assistant => message::assistant_message(&turn.content),
            });
        }
        messages.push(message::user_message(user_message));

        let mut request = ChatRequest {
            model: self.chat_model.clone(),
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let outcome = orchestrator::run_loop(
            self.provider.as_ref(),
            &mut request,
            &self.registry,
            self.max_iterations,
        )
        .await?;

        self.state.push(TurnRole::User, user_message);
        self.state.push(TurnRole::Assistant, &outcome.answer);
        Ok(outcome)
    }
}
