//! Capability catalog and invocation plumbing.
//!
//! A capability is a named, described unit of work the routing model
//! can invoke with a single string input. The catalog (name plus
//! description) is the only thing exposed to the model; handlers stay
//! behind the [`CapabilityHandler`] seam so HTTP tools, document
//! retrieval, and test fakes all look the same to the loop.

mod http;
mod rag;
mod registry;

pub use http::{HttpTool, def_calc, def_datetime, def_weather};
pub use rag::DocumentQa;
pub use registry::ToolRegistry;

#[cfg(test)]
pub(crate) use registry::tests::FakeCapability;

/// The default capability catalog, in registration order.
///
/// Metadata only, no clients or index. Used by the `tools` listing
/// and mirrored by the handlers a session registers.
#[must_use]
pub fn default_catalog() -> Vec<Capability> {
    vec![
        http::datetime_capability(),
        http::weather_capability(),
        http::calc_capability(),
        rag::document_qa_capability(),
    ]
}

use async_trait::async_trait;

use crate::error::CapabilityError;

/// How a capability interacts with the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Reads local state only; safe to repeat.
    IdempotentRead,
    /// Calls an external service.
    ExternalCall,
}

impl std::fmt::Display for SideEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdempotentRead => write!(f, "idempotent-read"),
            Self::ExternalCall => write!(f, "external-call"),
        }
    }
}

/// Catalog entry for a capability: what the routing model sees.
#[derive(Debug, Clone)]
pub struct Capability {
    /// Unique name used in `Action:` lines.
    pub name: String,
    /// When-to-use description shown to the routing model.
    pub description: String,
    /// Side-effect class, surfaced in the `tools` listing.
    pub side_effect: SideEffect,
}

impl Capability {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(name: &str, description: &str, side_effect: SideEffect) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            side_effect,
        }
    }
}

/// Result of one capability invocation, as seen by the loop.
///
/// Failures are carried as content with `is_error` set, never as `Err`:
/// the loop reports them to the routing model as observations and lets
/// it decide how to proceed.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// Observation text fed back to the routing model.
    pub content: String,
    /// Whether the invocation failed.
    pub is_error: bool,
}

impl InvocationResult {
    /// A successful observation.
    #[must_use]
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// A failure observation describing what went wrong.
    #[must_use]
    pub fn error(error: &CapabilityError) -> Self {
        Self {
            content: format!("Tool call failed: {error}"),
            is_error: true,
        }
    }
}

/// Trait for capability implementations.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// The catalog entry this handler serves.
    fn capability(&self) -> &Capability;

    /// Invokes the capability with a single string input.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] on transport, protocol, or timeout
    /// failures. The registry converts these into failure observations.
    async fn invoke(&self, input: &str) -> Result<String, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_effect_display() {
        assert_eq!(SideEffect::IdempotentRead.to_string(), "idempotent-read");
        assert_eq!(SideEffect::ExternalCall.to_string(), "external-call");
    }

    #[test]
    fn test_default_catalog_order() {
        let names: Vec<String> = default_catalog().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            ["get_datetime", "get_weather", "get_calc", "document_qa"]
        );
    }

    #[test]
    fn test_invocation_result_error_is_flagged() {
        let err = CapabilityError::Timeout {
            name: "get_weather".to_string(),
            seconds: 30,
        };
        let result = InvocationResult::error(&err);
        assert!(result.is_error);
        assert!(result.content.starts_with("Tool call failed:"));
        assert!(result.content.contains("get_weather"));
    }
}
