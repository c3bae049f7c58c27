//! CLI layer for docent-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! indexing a document, asking one-shot questions, interactive chat,
//! and inspecting the index and capability catalog.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, ModelArgs};
