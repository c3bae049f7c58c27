//! Output formatting for CLI commands.
//!
//! Every command renders through these helpers so `--format json` stays
//! consistent across the surface.

use serde_json::json;

use crate::agent::LoopOutcome;
use crate::error::{CommandError, Result};
use crate::index::IndexStats;
use crate::tool::Capability;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// JSON for scripting.
    Json,
}

impl OutputFormat {
    /// Parses a format string, defaulting to text for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

fn to_json(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| CommandError::OutputFormat(e.to_string()))
}

/// Formats persisted index statistics.
pub fn format_index_stats(stats: &IndexStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "Index statistics:\n\
             \x20 Source:          {}\n\
             \x20 Chunks:          {}\n\
             \x20 Dimension:       {}\n\
             \x20 Embedding model: {}\n",
            stats.source, stats.chunk_count, stats.dimension, stats.embedding_model
        )),
        OutputFormat::Json => to_json(&json!({
            "source": stats.source,
            "chunk_count": stats.chunk_count,
            "dimension": stats.dimension,
            "embedding_model": stats.embedding_model,
        })),
    }
}

/// Formats the capability catalog.
pub fn format_catalog(catalog: &[Capability], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = format!("Available tools ({}):\n", catalog.len());
            for cap in catalog {
                out.push_str(&format!(
                    "  {} [{}]\n      {}\n",
                    cap.name, cap.side_effect, cap.description
                ));
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let tools: Vec<_> = catalog
                .iter()
                .map(|cap| {
                    json!({
                        "name": cap.name,
                        "side_effect": cap.side_effect.to_string(),
                        "description": cap.description,
                    })
                })
                .collect();
            to_json(&json!({ "tools": tools }))
        }
    }
}

/// Formats one answered question.
///
/// Verbose text output includes the capability steps the loop took.
pub fn format_outcome(outcome: &LoopOutcome, verbose: bool, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if verbose {
                for step in &outcome.steps {
                    let marker = if step.is_error { "failed" } else { "ok" };
                    out.push_str(&format!(
                        "[step {}] {}({}) -> {marker}\n",
                        step.iteration, step.capability, step.input
                    ));
                }
            }
            out.push_str(&outcome.answer);
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Json => {
            let steps: Vec<_> = outcome
                .steps
                .iter()
                .map(|step| {
                    json!({
                        "iteration": step.iteration,
                        "capability": step.capability,
                        "input": step.input,
                        "observation": step.observation,
                        "is_error": step.is_error,
                    })
                })
                .collect();
            to_json(&json!({
                "answer": outcome.answer,
                "budget_exhausted": outcome.budget_exhausted,
                "steps": steps,
            }))
        }
    }
}
