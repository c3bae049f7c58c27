//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. Routing intelligence is injected
//! through this seam, so tests substitute a scripted fake provider for
//! deterministic loop behavior.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls) for a
/// specific provider while presenting a uniform interface to the
/// orchestration loop and the answer synthesizer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or timeouts.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::agent::message::TokenUsage;

    /// Scripted provider for deterministic loop tests.
    ///
    /// Returns the scripted responses in order; the last response
    /// repeats once the script is exhausted. Records every request's
    /// message count and the most recent request's message contents
    /// for assertions on what the loop sent.
    pub(crate) struct MockProvider {
        responses: Vec<String>,
        call_count: AtomicUsize,
        message_counts: Mutex<Vec<usize>>,
        last_request: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockProvider {
        pub(crate) fn scripted(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().map(ToString::to_string).collect(),
                call_count: AtomicUsize::new(0),
                message_counts: Mutex::new(Vec::new()),
                last_request: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                responses: Vec::new(),
                call_count: AtomicUsize::new(0),
                message_counts: Mutex::new(Vec::new()),
                last_request: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub(crate) fn message_counts(&self) -> Vec<usize> {
            self.message_counts
                .lock()
                .map(|counts| counts.clone())
                .unwrap_or_default()
        }

        pub(crate) fn last_request(&self) -> Vec<String> {
            self.last_request
                .lock()
                .map(|messages| messages.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut counts) = self.message_counts.lock() {
                counts.push(request.messages.len());
            }
            if let Ok(mut last) = self.last_request.lock() {
                *last = request
                    .messages
                    .iter()
                    .map(|m| m.content.clone())
                    .collect();
            }

            if self.fail {
                return Err(AgentError::ApiRequest {
                    message: "mock provider failure".to_string(),
                    status: Some(500),
                });
            }

            let content = self
                .responses
                .get(call)
                .or_else(|| self.responses.last())
                .cloned()
                .unwrap_or_default();

            Ok(ChatResponse {
                content,
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }
}
