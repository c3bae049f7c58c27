//! Document question-answering capability.
//!
//! Wraps the retriever and the answer synthesizer as a catalog entry,
//! so "questions about the indexed document" route through the same
//! Action/Observation protocol as every other capability.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Capability, CapabilityHandler, SideEffect};
use crate::agent::provider::LlmProvider;
use crate::agent::synthesizer::AnswerSynthesizer;
use crate::error::CapabilityError;
use crate::retrieval::Retriever;

/// Capability that answers questions from the indexed document.
pub struct DocumentQa {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    provider: Arc<dyn LlmProvider>,
    top_k: usize,
    capability: Capability,
}

impl std::fmt::Debug for DocumentQa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentQa")
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl DocumentQa {
    /// Creates the document QA capability.
    #[must_use]
    pub fn new(
        retriever: Retriever,
        synthesizer: AnswerSynthesizer,
        provider: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            synthesizer,
            provider,
            top_k,
            capability: document_qa_capability(),
        }
    }
}

/// Catalog entry for the document QA capability.
pub(crate) fn document_qa_capability() -> Capability {
    Capability::new(
        "document_qa",
        "Use this tool ONLY for questions about the contents of the \
         indexed local document.",
        SideEffect::IdempotentRead,
    )
}

#[async_trait]
impl CapabilityHandler for DocumentQa {
    fn capability(&self) -> &Capability {
        &self.capability
    }

    async fn invoke(&self, input: &str) -> Result<String, CapabilityError> {
        let chunks = self.retriever.retrieve(input, self.top_k).await.map_err(
            |e| CapabilityError::InvalidResponse {
                name: self.capability.name.clone(),
                message: e.to_string(),
            },
        )?;

        debug!(
            question = input,
            retrieved = chunks.len(),
            "answering from document"
        );

        self.synthesizer
            .synthesize(self.provider.as_ref(), input, &chunks)
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                name: self.capability.name.clone(),
                message: e.to_string(),
            })
    }
}
