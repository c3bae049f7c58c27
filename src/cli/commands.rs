//! CLI command implementations.
//!
//! Commands are synchronous at the surface and bridge into the async
//! components through a per-command tokio runtime. Every command except
//! the chat REPL returns its output as a string; `main` writes it.

use std::io::{self, BufRead, Write as IoWrite};
use std::path::Path;

use tracing::info;

use crate::agent::{PromptSet, Session};
use crate::cli::output::{self, OutputFormat};
use crate::cli::parser::{Cli, Commands, ModelArgs};
use crate::config::{AssistantConfig, AssistantConfigBuilder};
use crate::embedding::create_embedder;
use crate::error::{CommandError, Result};
use crate::index::{DocumentIndexer, VectorIndex};
use crate::tool::default_catalog;

/// Words that end the chat REPL (case-insensitive).
const EXIT_WORDS: [&str; 3] = ["quit", "exit", "bye"];

/// Executes the parsed CLI command and returns its output.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Index {
            file,
            chunk_size,
            overlap,
            force,
            model,
        } => cmd_index(file, *chunk_size, *overlap, *force, model, format),
        Commands::Ask {
            question,
            file,
            model,
        } => cmd_ask(question, file, model, cli.verbose, format),
        Commands::Chat { file, model } => cmd_chat(file, model),
        Commands::Tools => output::format_catalog(&default_catalog(), format),
        Commands::Status { index_dir } => cmd_status(index_dir.as_deref(), format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref()),
    }
}

/// Applies the shared model/endpoint CLI flags on top of
/// environment-resolved settings.
fn resolve_builder(model: &ModelArgs) -> AssistantConfigBuilder {
    let mut builder = AssistantConfigBuilder::default().from_env();
    if let Some(v) = &model.api_base {
        builder = builder.api_base(v);
    }
    if let Some(v) = &model.chat_model {
        builder = builder.chat_model(v);
    }
    if let Some(v) = &model.embedding_model {
        builder = builder.embedding_model(v);
    }
    if let Some(v) = &model.tool_server {
        builder = builder.tool_server_url(v);
    }
    if let Some(v) = &model.index_dir {
        builder = builder.index_dir(v);
    }
    if let Some(v) = &model.prompt_dir {
        builder = builder.prompt_dir(v);
    }
    if let Some(v) = model.top_k {
        builder = builder.top_k(v);
    }
    if let Some(v) = model.max_iterations {
        builder = builder.max_iterations(v);
    }
    builder
}

/// Resolves CLI overrides and environment into an [`AssistantConfig`].
fn resolve_config(model: &ModelArgs) -> Result<AssistantConfig> {
    Ok(resolve_builder(model).build()?)
}

/// Config for the index command: the shared flags plus the command's
/// own chunk geometry, which always wins.
fn index_config(chunk_size: usize, overlap: usize, model: &ModelArgs) -> Result<AssistantConfig> {
    Ok(resolve_builder(model)
        .chunk_size(chunk_size)
        .chunk_overlap(overlap)
        .build()?)
}

/// Creates a tokio runtime as the sync/async bridge.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")))
}

fn cmd_index(
    file: &Path,
    chunk_size: usize,
    overlap: usize,
    force: bool,
    model: &ModelArgs,
    format: OutputFormat,
) -> Result<String> {
    let config = index_config(chunk_size, overlap, model)?;

    if force && VectorIndex::exists(&config.index_dir) {
        info!(dir = %config.index_dir.display(), "removing existing index");
        std::fs::remove_dir_all(&config.index_dir)?;
    }

    let embedder = create_embedder(&config)?;
    let indexer = DocumentIndexer::new(embedder, config.chunk_size, config.chunk_overlap);

    let rt = runtime()?;
    rt.block_on(indexer.build_or_load(file, &config.index_dir))?;

    let stats = VectorIndex::read_stats(&config.index_dir)?;
    output::format_index_stats(&stats, format)
}

fn cmd_ask(
    question: &str,
    file: &Path,
    model: &ModelArgs,
    verbose: bool,
    format: OutputFormat,
) -> Result<String> {
    let config = resolve_config(model)?;
    let rt = runtime()?;

    let outcome = rt.block_on(async {
        let mut session = Session::new(&config, file).await?;
        session.send(question).await.map_err(CommandError::Agent)
    })?;

    output::format_outcome(&outcome, verbose, format)
}

fn cmd_chat(file: &Path, model: &ModelArgs) -> Result<String> {
    let config = resolve_config(model)?;
    let rt = runtime()?;
    let mut session = rt.block_on(Session::new(&config, file))?;

    let stdout = io::stdout();
    let stdin = io::stdin();
    let mut out = stdout.lock();

    writeln!(
        out,
        "docent-rs chat ({} over {}). Type quit, exit, or bye to leave.",
        config.chat_model,
        file.display()
    )?;

    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            writeln!(out, "Goodbye.")?;
            break;
        }

        match rt.block_on(session.send(message)) {
            Ok(outcome) => {
                writeln!(out, "Assistant: {}", outcome.answer)?;
                writeln!(out, "{}", "-".repeat(60))?;
            }
            Err(e) => {
                let _ = writeln!(io::stderr(), "Error: {e}");
            }
        }
    }

    Ok(String::new())
}

fn cmd_status(index_dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let dir = index_dir.map_or_else(
        || AssistantConfig::from_env().map(|c| c.index_dir),
        |d| Ok(d.to_path_buf()),
    )?;

    if !VectorIndex::exists(&dir) {
        return Ok(format!(
            "No index found at {}. Run 'docent-rs index <file>' first.\n",
            dir.display()
        ));
    }

    let stats = VectorIndex::read_stats(&dir)?;
    output::format_index_stats(&stats, format)
}

fn cmd_init_prompts(dir: Option<&Path>) -> Result<String> {
    let target = dir.map_or_else(PromptSet::default_dir, |d| Some(d.to_path_buf()));
    let Some(target) = target else {
        return Err(CommandError::ExecutionFailed(
            "cannot determine the home directory; pass --dir".to_string(),
        ));
    };

    let written = PromptSet::write_defaults(&target)?;
    if written.is_empty() {
        return Ok(format!(
            "Prompt templates already exist in {}.\n",
            target.display()
        ));
    }

    let mut out = format!("Wrote {} prompt template(s):\n", written.len());
    for path in written {
        out.push_str(&format!("  {}\n", path.display()));
    }
    out.push_str("Edit these files to customize the assistant's prompts.\n");
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_tools_command_lists_catalog() {
        let cli = Cli::try_parse_from(["docent-rs", "tools"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        let out = execute(&cli).unwrap_or_else(|e| panic!("execute failed: {e}"));
        assert!(out.contains("get_datetime"));
        assert!(out.contains("get_weather"));
        assert!(out.contains("get_calc"));
        assert!(out.contains("document_qa"));
    }

    #[test]
    fn test_resolve_config_applies_all_model_args() {
        use std::path::PathBuf;

        let args = ModelArgs {
            api_base: Some("http://example:1234/v1".to_string()),
            chat_model: Some("llama3".to_string()),
            embedding_model: Some("mxbai-embed-large".to_string()),
            tool_server: Some("http://tools:9000".to_string()),
            index_dir: Some(PathBuf::from("/tmp/idx")),
            prompt_dir: Some(PathBuf::from("/tmp/prompts")),
            top_k: Some(7),
            max_iterations: Some(5),
        };
        let config = resolve_config(&args).unwrap_or_else(|e| panic!("resolve failed: {e}"));
        assert_eq!(config.api_base, "http://example:1234/v1");
        assert_eq!(config.chat_model, "llama3");
        assert_eq!(config.embedding_model, "mxbai-embed-large");
        assert_eq!(config.tool_server_url, "http://tools:9000");
        assert_eq!(config.index_dir, PathBuf::from("/tmp/idx"));
        assert_eq!(config.prompt_dir.as_deref(), Some(Path::new("/tmp/prompts")));
        assert_eq!(config.top_k, 7);
        assert_eq!(config.max_iterations, 5);
    }

    #[test]
    fn test_index_config_takes_geometry_and_shared_flags() {
        let args = ModelArgs {
            api_base: None,
            chat_model: None,
            embedding_model: None,
            tool_server: Some("http://tools:9000".to_string()),
            index_dir: None,
            prompt_dir: None,
            top_k: Some(9),
            max_iterations: None,
        };
        let config = index_config(500, 50, &args).unwrap_or_else(|e| panic!("resolve failed: {e}"));
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.tool_server_url, "http://tools:9000");
        assert_eq!(config.top_k, 9);
    }

    #[test]
    fn test_status_missing_index() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let out = cmd_status(Some(tmp.path()), OutputFormat::Text)
            .unwrap_or_else(|e| panic!("status failed: {e}"));
        assert!(out.contains("No index found"));
    }

    #[test]
    fn test_init_prompts_into_directory() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let target = tmp.path().join("prompts");
        let out =
            cmd_init_prompts(Some(&target)).unwrap_or_else(|e| panic!("init-prompts failed: {e}"));
        assert!(out.contains("Wrote 2"));
        assert!(target.join("router.md").exists());
        assert!(target.join("grounding.md").exists());

        // Second run leaves existing files alone.
        let out =
            cmd_init_prompts(Some(&target)).unwrap_or_else(|e| panic!("init-prompts failed: {e}"));
        assert!(out.contains("already exist"));
    }
}
