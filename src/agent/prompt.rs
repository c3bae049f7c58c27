//! System prompts and template builders for the assistant.
//!
//! Prompts are the core instructions that define routing and grounded
//! answering. Template builders format the capability catalog, retrieval
//! context, observations, and correction notes into model messages.

use std::fmt::Write;
use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

use crate::retrieval::ScoredChunk;
use crate::tool::Capability;

/// System prompt for the routing model.
///
/// Instruction sequence: analyze the request, consult the capability
/// catalog, use a capability when one clearly applies, otherwise answer
/// from general knowledge, and never mention internal tooling to the
/// user.
pub const ROUTER_SYSTEM_PROMPT: &str = r"You are a helpful local assistant with access to a set of tools.

For every user message, follow these steps:
1. Analyze the request and the conversation so far.
2. Consult the tool catalog below. Each tool has a name and a description of when to use it.
3. If a tool clearly applies, use it. If none applies, answer directly from your general knowledge.
4. Never mention tool names, observations, or any internal machinery to the user.

Reply using EXACTLY one of these two forms and nothing else:

To use a tool:
Action: <tool name>
Action Input: <single-line input for the tool>

To answer the user:
Final Answer: <your complete answer>

Rules:
- Use at most one Action per reply.
- Never combine an Action with a Final Answer in the same reply.
- After you receive an observation, decide again: another Action or a Final Answer.
- If a tool reports a failure, you may retry it, try a different tool, or explain to the user that the information is unavailable.";

/// System prompt for grounded answer synthesis.
pub const GROUNDING_SYSTEM_PROMPT: &str = r"You are an assistant for question-answering tasks.
Answer the question based ONLY on the supplied context.
If the context does not contain the answer, reply with exactly:
I don't know based on the provided context.
Do not use outside knowledge. Do not fabricate.";

/// Correction note sent after a malformed routing decision.
pub const CORRECTION_NOTE: &str = "Your previous reply could not be understood. Reply using \
     EXACTLY one of the two forms: 'Action:' followed by 'Action Input:' on the next line, \
     or 'Final Answer:' followed by your answer. Do not include anything else.";

/// Maximum characters of retrieved context included in a grounding prompt.
const MAX_CONTEXT_CHARS: usize = 8_000;

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/docent-rs/prompts";

/// Filename for the router prompt template.
const ROUTER_FILENAME: &str = "router.md";
/// Filename for the grounding prompt template.
const GROUNDING_FILENAME: &str = "grounding.md";

/// A set of system prompts for the assistant.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Use [`PromptSet::load`] to resolve the prompt
/// directory from CLI flags, environment variables, or the default path.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt for the routing model.
    pub router: String,
    /// System prompt for grounded answer synthesis.
    pub grounding: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir` CLI flag)
    /// 2. `DOCENT_PROMPT_DIR` environment variable
    /// 3. `~/.config/docent-rs/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(std::path::PathBuf::from)
            .or_else(|| {
                std::env::var("DOCENT_PROMPT_DIR")
                    .ok()
                    .map(std::path::PathBuf::from)
            })
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR)));

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            router: load_file(ROUTER_FILENAME, ROUTER_SYSTEM_PROMPT),
            grounding: load_file(GROUNDING_FILENAME, GROUNDING_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            router: ROUTER_SYSTEM_PROMPT.to_string(),
            grounding: GROUNDING_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten; use this for initial scaffolding only.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (ROUTER_FILENAME, ROUTER_SYSTEM_PROMPT),
            (GROUNDING_FILENAME, GROUNDING_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Builds the router system prompt with the capability catalog appended.
///
/// Only each capability's name and description are exposed, never the
/// implementation.
#[must_use]
pub fn build_router_prompt(base: &str, catalog: &[Capability]) -> String {
    let mut prompt = format!("{base}\n\n<tools>\n");
    for cap in catalog {
        let _ = writeln!(prompt, "- {}: {}", cap.name, cap.description);
    }
    prompt.push_str("</tools>");
    prompt
}

/// Builds the observation message sent back to the routing model after
/// a capability invocation.
#[must_use]
pub fn build_observation(capability: &str, observation: &str) -> String {
    format!(
        "Observation from {capability}:\n{observation}\n\n\
         Decide again: another Action, or a Final Answer."
    )
}

/// Builds the user message for grounded answer synthesis.
///
/// Concatenates the retrieved chunks (order preserved from the
/// retriever) into a bounded context block followed by the question.
/// The best-scoring chunk is always included, truncated to the bound
/// when it alone exceeds it; later chunks that would overflow the
/// bound are dropped whole.
#[must_use]
pub fn build_grounding_prompt(question: &str, context_chunks: &[ScoredChunk]) -> String {
    let mut context = String::new();
    for scored in context_chunks {
        let text = scored.chunk.text.as_str();
        if context.is_empty() {
            context.push_str(grapheme_prefix(text, MAX_CONTEXT_CHARS));
            continue;
        }
        if context.len() + 2 + text.len() > MAX_CONTEXT_CHARS {
            break;
        }
        context.push_str("\n\n");
        context.push_str(text);
    }

    format!("<context>\n{context}\n</context>\n\nQuestion: {question}")
}

/// Longest prefix of `text` within `max_bytes` that ends on a grapheme
/// cluster boundary.
fn grapheme_prefix(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        if offset + grapheme.len() > max_bytes {
            break;
        }
        cut = offset + grapheme.len();
    }
    &text[..cut]
}
