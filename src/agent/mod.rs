//! Conversational agent: routing loop, sessions, and answer synthesis.
//!
//! One user message runs one bounded decision loop against the routing
//! model. The model either invokes a capability (and sees its
//! observation) or produces a final answer.
//!
//! # State machine
//!
//! ```text
//! User message → AWAITING_DECISION
//!   ├── Action/Action Input → CAPABILITY_INVOKED
//!   │     └── observation appended → AWAITING_DECISION
//!   ├── Final Answer → FINAL
//!   └── malformed output → corrective re-prompt → AWAITING_DECISION
//!
//! Each transition out of AWAITING_DECISION consumes one unit of the
//! iteration budget; exhaustion terminates with a fixed apology.
//! ```
//!
//! Only the user message and the final answer become durable
//! [`ConversationState`] turns; everything in between is loop-local.

pub mod client;
pub mod decision;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod session;
pub mod synthesizer;

// Re-export key types
pub use client::create_provider;
pub use decision::RouteDecision;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{AgentStep, EXHAUSTED_ANSWER, LoopOutcome, run_loop};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use providers::OpenAiProvider;
pub use session::{ConversationState, ConversationTurn, Session, TurnRole};
pub use synthesizer::{AnswerSynthesizer, UNKNOWN_MARKER};
