//! Concrete [`LlmProvider`](crate::agent::provider::LlmProvider) implementations.

mod openai;

pub use openai::OpenAiProvider;
