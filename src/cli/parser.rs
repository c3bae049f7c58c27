//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};

/// docent-rs: a grounded local assistant.
///
/// Indexes one document for retrieval-augmented answers and routes
/// questions between the document, external HTTP tools, and the model's
/// general knowledge.
#[derive(Parser, Debug)]
#[command(name = "docent-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (loop steps, debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Model and endpoint options shared by session-constructing commands.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// OpenAI-compatible API base URL for chat and embeddings.
    #[arg(long, env = "DOCENT_API_BASE")]
    pub api_base: Option<String>,

    /// Chat model for routing decisions and grounded answers.
    #[arg(long, env = "DOCENT_CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Embedding model for index build and query time.
    #[arg(long, env = "DOCENT_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Base URL of the external tool-provider HTTP service.
    #[arg(long, env = "DOCENT_TOOL_SERVER")]
    pub tool_server: Option<String>,

    /// Directory holding the persisted vector index.
    #[arg(long, env = "DOCENT_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,

    /// Directory containing prompt template files.
    #[arg(long, env = "DOCENT_PROMPT_DIR")]
    pub prompt_dir: Option<PathBuf>,

    /// Number of chunks retrieved per document question.
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Maximum decision/invoke cycles per message.
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the vector index for a document.
    ///
    /// Skipped if an index already exists at the target directory;
    /// use --force to delete and rebuild.
    #[command(after_help = r"Examples:
  docent-rs index notes.txt                 # Index a plain-text document
  docent-rs index report.pdf --force        # Delete and rebuild the index
  docent-rs index notes.txt --chunk-size 500 --overlap 100
")]
    Index {
        /// Path to the source document (.pdf or plain text).
        file: PathBuf,

        /// Chunk size in grapheme clusters.
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Overlap between chunks in grapheme clusters.
        #[arg(long, default_value_t = DEFAULT_OVERLAP)]
        overlap: usize,

        /// Delete any existing index before building.
        #[arg(short, long)]
        force: bool,

        /// Model and endpoint options.
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Ask a single question through a fresh session.
    #[command(after_help = r#"Examples:
  docent-rs ask -f notes.txt "What does the report conclude?"
  docent-rs ask -f notes.txt "What is 2 + 2?" --verbose
  docent-rs --format json ask -f notes.txt "Summarize" | jq .answer
"#)]
    Ask {
        /// The question to ask.
        question: String,

        /// Path to the source document backing document questions.
        #[arg(short, long, env = "DOCENT_SOURCE")]
        file: PathBuf,

        /// Model and endpoint options.
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Start an interactive chat session.
    ///
    /// Type quit, exit, or bye to leave.
    #[command(after_help = r"Examples:
  docent-rs chat -f notes.txt
  docent-rs chat -f report.pdf --chat-model llama3.2
")]
    Chat {
        /// Path to the source document backing document questions.
        #[arg(short, long, env = "DOCENT_SOURCE")]
        file: PathBuf,

        /// Model and endpoint options.
        #[command(flatten)]
        model: ModelArgs,
    },

    /// List the capability catalog.
    Tools,

    /// Show persisted index statistics.
    Status {
        /// Directory holding the persisted vector index.
        #[arg(long, env = "DOCENT_INDEX_DIR")]
        index_dir: Option<PathBuf>,
    },

    /// Write the default prompt templates for customization.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory (default: ~/.config/docent-rs/prompts).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
