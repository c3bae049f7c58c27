//! # docent-rs
//!
//! A grounded local assistant over one document and a small tool
//! catalog. Questions run through a bounded decision loop: the routing
//! model either answers directly, calls an external HTTP tool, or
//! answers from the document via retrieval-augmented synthesis.
//!
//! ## Pipeline
//!
//! ```text
//! document ──► chunking ──► embeddings ──► SQLite index
//!                                              │
//! user message ──► Session ──► decision loop ──┤
//!                    │            │            ▼
//!                    │            │      document_qa (retrieve + ground)
//!                    │            ├───── get_datetime / get_weather / get_calc
//!                    │            ▼
//!                    └──── final answer (durable conversation turn)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use docent_rs::agent::Session;
//! use docent_rs::config::AssistantConfig;
//!
//! # async fn run() -> Result<(), docent_rs::error::CommandError> {
//! let config = AssistantConfig::from_env()?;
//! let mut session = Session::new(&config, "notes.txt".as_ref()).await?;
//! let outcome = session.send("What does the document conclude?").await?;
//! println!("{}", outcome.answer);
//! # Ok(())
//! # }
//! ```
//!
//! Defaults target a local Ollama runtime (`qwen3:1.7b` for chat,
//! `nomic-embed-text` for embeddings); any OpenAI-compatible endpoint
//! works via configuration.

pub mod agent;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod retrieval;
pub mod tool;

pub use agent::{LoopOutcome, Session};
pub use config::AssistantConfig;
pub use error::{AgentError, CapabilityError, CommandError, IndexError, RegistryError, Result};
pub use index::{DocumentIndexer, IndexStats, VectorIndex};
pub use retrieval::{Retriever, ScoredChunk};
pub use tool::{Capability, ToolRegistry};
