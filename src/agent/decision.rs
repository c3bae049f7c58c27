//! Routing-decision parsing.
//!
//! The routing model replies in a plain-text protocol: either
//! `Action:` / `Action Input:` lines naming a capability to invoke, or a
//! `Final Answer:` block ending the loop. The parser is tolerant of
//! markdown code fences and of `<think>…</think>` reasoning segments
//! emitted by thinking-mode models, but rejects output that fits
//! neither form; the loop turns that rejection into a corrective
//! re-prompt.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AgentError;

/// Matches `<think>…</think>` reasoning segments, including unclosed
/// trailing ones.
static THINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<think>.*?(</think>|\z)").unwrap_or_else(|_| unreachable!())
});

/// Matches an `Action:` line naming a capability.
static ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Action:\s*(\S[^\n]*)$").unwrap_or_else(|_| unreachable!()));

/// Matches the `Action Input:` line carrying the capability input.
static ACTION_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Action Input:\s*([^\n]*)$").unwrap_or_else(|_| unreachable!())
});

/// Matches a `Final Answer:` marker; everything after it is the answer.
static FINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Final Answer:\s*(.*)\z").unwrap_or_else(|_| unreachable!()));

/// One routing decision emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Invoke the named capability with a single string input.
    Invoke {
        /// Capability name from the catalog.
        capability: String,
        /// Raw input string for the capability.
        input: String,
    },
    /// Return a final natural-language answer to the user.
    Final {
        /// The answer text.
        answer: String,
    },
}

impl RouteDecision {
    /// Parses raw model output into a routing decision.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::RoutingParse`] when the output is empty,
    /// contains both an action and a final answer, names an action
    /// without an input line, or matches neither form. The error carries
    /// a content preview for diagnostics.
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        let stripped = THINK_RE.replace_all(content, "");
        let cleaned = strip_code_fences(stripped.trim());

        if cleaned.is_empty() {
            return Err(parse_error("decision output is empty", content));
        }

        let action = ACTION_RE.captures(&cleaned);
        let final_answer = FINAL_RE.captures(&cleaned);

        match (action, final_answer) {
            (Some(_), Some(_)) => Err(parse_error(
                "output contains both an Action and a Final Answer",
                content,
            )),
            (Some(action), None) => {
                let capability = action[1].trim().to_string();
                let input = ACTION_INPUT_RE
                    .captures(&cleaned)
                    .map(|c| c[1].trim().to_string())
                    .ok_or_else(|| {
                        parse_error("Action given without an Action Input line", content)
                    })?;
                Ok(Self::Invoke { capability, input })
            }
            (None, Some(final_answer)) => {
                let answer = final_answer[1].trim().to_string();
                if answer.is_empty() {
                    return Err(parse_error("Final Answer is empty", content));
                }
                Ok(Self::Final { answer })
            }
            (None, None) => Err(parse_error(
                "output matches neither 'Action:'/'Action Input:' nor 'Final Answer:'",
                content,
            )),
        }
    }
}

/// Strips a single wrapping markdown code fence, if present.
fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    if let Some(inner) = trimmed.strip_prefix("```") {
        let inner = inner
            .split_once('\n')
            .map_or("", |(first_line, rest)| {
                // The first fence line may carry a language tag.
                if first_line.trim().chars().all(char::is_alphanumeric) {
                    rest
                } else {
                    inner
                }
            });
        return inner.trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}

/// Builds a [`AgentError::RoutingParse`] with a bounded content preview.
fn parse_error(message: &str, content: &str) -> AgentError {
    const PREVIEW_LEN: usize = 200;
    let preview: String = content.chars().take(PREVIEW_LEN).collect();
    AgentError::RoutingParse {
        message: format!("{message} (preview: {preview:?})"),
        content: content.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parse(content: &str) -> RouteDecision {
        RouteDecision::parse(content).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    #[test]
    fn test_parse_invoke() {
        let decision = parse("Action: get_weather\nAction Input: London, UK");
        assert_eq!(
            decision,
            RouteDecision::Invoke {
                capability: "get_weather".to_string(),
                input: "London, UK".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_final_answer() {
        let decision = parse("Final Answer: The result is 4.");
        assert_eq!(
            decision,
            RouteDecision::Final {
                answer: "The result is 4.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_multiline_final_answer() {
        let decision = parse("Final Answer: First line.\nSecond line.");
        assert_eq!(
            decision,
            RouteDecision::Final {
                answer: "First line.\nSecond line.".to_string(),
            }
        );
    }

    #[test]
    fn test_think_block_stripped() {
        let decision = parse(
            "<think>The user wants arithmetic, I should use the calc \
             tool.</think>\nAction: get_calc\nAction Input: ADD, 2, 2",
        );
        assert_eq!(
            decision,
            RouteDecision::Invoke {
                capability: "get_calc".to_string(),
                input: "ADD, 2, 2".to_string(),
            }
        );
    }

    #[test]
    fn test_unclosed_think_block_is_malformed() {
        // A truncated response that never left the reasoning segment.
        let result = RouteDecision::parse("<think>still thinking about Action: foo");
        assert!(result.is_err());
    }

    #[test]
    fn test_code_fence_stripped() {
        let decision = parse("```\nAction: get_datetime\nAction Input: Paris\n```");
        assert_eq!(
            decision,
            RouteDecision::Invoke {
                capability: "get_datetime".to_string(),
                input: "Paris".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_action_input_allowed() {
        // The datetime tool accepts an empty input for the local system.
        let decision = parse("Action: get_datetime\nAction Input:");
        assert_eq!(
            decision,
            RouteDecision::Invoke {
                capability: "get_datetime".to_string(),
                input: String::new(),
            }
        );
    }

    #[test_case("" ; "empty output")]
    #[test_case("   \n  " ; "whitespace only")]
    #[test_case("I think the answer might be 4." ; "no markers")]
    #[test_case("Action: get_calc" ; "action without input")]
    #[test_case("Action: a\nAction Input: b\nFinal Answer: c" ; "both forms")]
    #[test_case("Final Answer:" ; "empty final answer")]
    fn test_malformed_output_rejected(content: &str) {
        let result = RouteDecision::parse(content);
        assert!(matches!(result, Err(AgentError::RoutingParse { .. })));
    }

    #[test]
    fn test_parse_error_carries_preview() {
        let Err(AgentError::RoutingParse { message, content }) =
            RouteDecision::parse("gibberish output")
        else {
            panic!("expected RoutingParse error");
        };
        assert!(message.contains("gibberish"));
        assert_eq!(content, "gibberish output");
    }
}
