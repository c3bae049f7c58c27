//! Bounded decision loop driving the routing model.
//!
//! One user message runs one loop: the routing model decides, the loop
//! either invokes a capability and feeds the observation back, or stops
//! with a final answer. Every model call (including malformed replies
//! that only earn a corrective re-prompt) consumes one unit of the
//! iteration budget, so a misbehaving model terminates deterministically.

use tracing::{debug, info, warn};

use super::decision::RouteDecision;
use super::message::{self, ChatRequest};
use super::prompt::{self, CORRECTION_NOTE};
use super::provider::LlmProvider;
use crate::error::AgentError;
use crate::tool::ToolRegistry;

/// Fixed reply when the iteration budget is exhausted without a final
/// answer.
pub const EXHAUSTED_ANSWER: &str =
    "I was unable to complete the request within the iteration limit.";

/// One resolved step of the decision loop.
///
/// Steps are transient diagnostics for the caller (verbose output,
/// logging); they are not part of the durable conversation state.
#[derive(Debug, Clone)]
pub struct AgentStep {
    /// Loop iteration this step ran in (1-based).
    pub iteration: usize,
    /// Capability that was invoked.
    pub capability: String,
    /// Input the routing model supplied.
    pub input: String,
    /// Observation fed back to the routing model.
    pub observation: String,
    /// Whether the invocation failed.
    pub is_error: bool,
}

/// Outcome of one decision loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Final answer text for the user.
    pub answer: String,
    /// Capability invocations made along the way.
    pub steps: Vec<AgentStep>,
    /// Whether the loop hit the iteration budget instead of a
    /// `Final Answer`.
    pub budget_exhausted: bool,
}

/// Runs the decision loop until a final answer or budget exhaustion.
///
/// The loop appends its working messages (assistant decisions,
/// observations, corrective re-prompts) to `request.messages` as it
/// goes; the caller owns the request and decides what survives into
/// durable conversation state.
///
/// # Errors
///
/// Returns [`AgentError`] only for provider failures. Malformed routing
/// output, unknown capability names, and capability failures are all
/// recovered in-loop.
pub async fn run_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    registry: &ToolRegistry,
    max_iterations: usize,
) -> Result<LoopOutcome, AgentError> {
    let mut steps = Vec::new();

    for iteration in 1..=max_iterations {
        debug!(iteration, max_iterations, "requesting routing decision");
        let response = provider.chat(request).await?;
        request
            .messages
            .push(message::assistant_message(&response.content));

        match RouteDecision::parse(&response.content) {
            Ok(RouteDecision::Final { answer }) => {
                info!(iteration, steps = steps.len(), "loop finished");
                return Ok(LoopOutcome {
                    answer,
                    steps,
                    budget_exhausted: false,
                });
            }
            Ok(RouteDecision::Invoke { capability, input }) => {
                if !registry.contains(&capability) {
                    warn!(capability, "routing model named an unknown capability");
                    request.messages.push(message::user_message(&format!(
                        "There is no tool named '{capability}'. Available tools: {}. \
                         Reply again with a valid Action or a Final Answer.",
                        registry.names().join(", ")
                    )));
                    continue;
                }

                let result = match registry.invoke(&capability, &input).await {
                    Ok(result) => result,
                    // Unreachable after the contains check; recover anyway.
                    Err(e) => {
                        request.messages.push(message::user_message(&e.to_string()));
                        continue;
                    }
                };

                info!(
                    iteration,
                    capability,
                    is_error = result.is_error,
                    "capability invoked"
                );
                request
                    .messages
                    .push(message::user_message(&prompt::build_observation(
                        &capability,
                        &result.content,
                    )));
                steps.push(AgentStep {
                    iteration,
                    capability,
                    input,
                    observation: result.content,
                    is_error: result.is_error,
                });
            }
            Err(e) => {
                warn!(iteration, error = %e, "malformed routing decision");
                request.messages.push(message::user_message(CORRECTION_NOTE));
            }
        }
    }

    warn!(max_iterations, "iteration budget exhausted");
    Ok(LoopOutcome {
        answer: EXHAUSTED_ANSWER.to_string(),
        steps,
        budget_exhausted: true,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::agent::provider::tests::MockProvider;
    use crate::tool::FakeCapability;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test-model".to_string(),
            messages: vec![
                message::system_message("router prompt"),
                message::user_message("user question"),
            ],
            temperature: Some(0.1),
            max_tokens: Some(256),
        }
    }

    fn registry_with(handlers: Vec<FakeCapability>) -> ToolRegistry {
        let mut registry = ToolRegistry::new(Duration::from_secs(5));
        for handler in handlers {
            registry
                .register(Arc::new(handler))
                .unwrap_or_else(|e| panic!("register failed: {e}"));
        }
        registry
    }

    async fn run(
        provider: &MockProvider,
        request: &mut ChatRequest,
        registry: &ToolRegistry,
    ) -> LoopOutcome {
        run_loop(provider, request, registry, 3)
            .await
            .unwrap_or_else(|e| panic!("run_loop failed: {e}"))
    }

    #[tokio::test]
    async fn test_direct_final_answer() {
        let provider = MockProvider::scripted(&["Final Answer: Paris."]);
        let registry = registry_with(vec![]);
        let mut req = request();

        let outcome = run(&provider, &mut req, &registry).await;
        assert_eq!(outcome.answer, "Paris.");
        assert!(outcome.steps.is_empty());
        assert!(!outcome.budget_exhausted);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invoke_then_final() {
        let provider = MockProvider::scripted(&[
            "Action: get_calc\nAction Input: ADD, 2, 2",
            "Final Answer: The result is 4.",
        ]);
        let registry = registry_with(vec![FakeCapability::ok("get_calc", "{\"result\": 4.0}")]);
        let mut req = request();

        let outcome = run(&provider, &mut req, &registry).await;
        assert_eq!(outcome.answer, "The result is 4.");
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].capability, "get_calc");
        assert_eq!(outcome.steps[0].input, "ADD, 2, 2");
        assert!(outcome.steps[0].observation.contains("4.0"));
        assert!(!outcome.steps[0].is_error);
        // Second call sees the decision and the observation appended.
        assert_eq!(provider.message_counts(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_malformed_decision_gets_correction() {
        let provider = MockProvider::scripted(&["I think the answer is 4.", "Final Answer: 4."]);
        let registry = registry_with(vec![]);
        let mut req = request();

        let outcome = run(&provider, &mut req, &registry).await;
        assert_eq!(outcome.answer, "4.");
        assert!(!outcome.budget_exhausted);
        // The retry carries the malformed reply plus the correction note.
        assert_eq!(provider.message_counts(), vec![2, 4]);
        assert!(req.messages.iter().any(|m| m.content == CORRECTION_NOTE));
    }

    #[tokio::test]
    async fn test_adversarial_model_exhausts_budget() {
        // Every reply is malformed; the script's last entry repeats.
        let provider = MockProvider::scripted(&["complete nonsense"]);
        let registry = registry_with(vec![]);
        let mut req = request();

        let outcome = run(&provider, &mut req, &registry).await;
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.answer, EXHAUSTED_ANSWER);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_capability_gets_correction() {
        let provider = MockProvider::scripted(&[
            "Action: get_stock_price\nAction Input: ACME",
            "Final Answer: I cannot look that up.",
        ]);
        let registry = registry_with(vec![FakeCapability::ok("get_calc", "x")]);
        let mut req = request();

        let outcome = run(&provider, &mut req, &registry).await;
        assert_eq!(outcome.answer, "I cannot look that up.");
        assert!(outcome.steps.is_empty());
        assert!(
            req.messages
                .iter()
                .any(|m| m.content.contains("no tool named 'get_stock_price'"))
        );
    }

    #[tokio::test]
    async fn test_capability_failure_becomes_observation() {
        let provider = MockProvider::scripted(&[
            "Action: get_weather\nAction Input: London",
            "Final Answer: The weather service is unavailable.",
        ]);
        let registry = registry_with(vec![FakeCapability::failing("get_weather")]);
        let mut req = request();

        let outcome = run(&provider, &mut req, &registry).await;
        assert_eq!(outcome.answer, "The weather service is unavailable.");
        assert_eq!(outcome.steps.len(), 1);
        assert!(outcome.steps[0].is_error);
        assert!(outcome.steps[0].observation.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_provider_error_aborts_loop() {
        let provider = MockProvider::failing();
        let registry = registry_with(vec![]);
        let mut req = request();

        let result = run_loop(&provider, &mut req, &registry, 3).await;
        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
    }
}
