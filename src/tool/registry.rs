//! Capability registry: ordered catalog plus timeout-guarded dispatch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{Capability, CapabilityHandler, InvocationResult};
use crate::error::{CapabilityError, RegistryError};

/// Registry of capability handlers.
///
/// Holds handlers in registration order, which is also catalog order in
/// the router prompt and the `tools` listing. Built once at session
/// wiring time and shared immutably afterwards.
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn CapabilityHandler>>,
    timeout: Duration,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("capabilities", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry with the given per-invocation timeout.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            handlers: Vec::new(),
            timeout,
        }
    }

    /// Registers a capability handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCapability`] if a handler with
    /// the same name is already registered.
    pub fn register(&mut self, handler: Arc<dyn CapabilityHandler>) -> Result<(), RegistryError> {
        let name = &handler.capability().name;
        if self.contains(name) {
            return Err(RegistryError::DuplicateCapability { name: name.clone() });
        }
        debug!(capability = %name, "registered capability");
        self.handlers.push(handler);
        Ok(())
    }

    /// Returns the catalog in registration order.
    #[must_use]
    pub fn catalog(&self) -> Vec<Capability> {
        self.handlers
            .iter()
            .map(|h| h.capability().clone())
            .collect()
    }

    /// Returns the capability names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|h| h.capability().name.clone())
            .collect()
    }

    /// Whether a capability with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|h| h.capability().name == name)
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invokes a capability by name with a timeout guard.
    ///
    /// Handler failures and timeouts become failure observations, not
    /// errors: the routing model is told what went wrong and decides
    /// whether to retry, switch capability, or answer without it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownCapability`] if no handler with
    /// this name is registered.
    pub async fn invoke(&self, name: &str, input: &str) -> Result<InvocationResult, RegistryError> {
        let handler = self
            .handlers
            .iter()
            .find(|h| h.capability().name == name)
            .ok_or_else(|| RegistryError::UnknownCapability {
                name: name.to_string(),
            })?;

        debug!(capability = %name, input, "invoking capability");

        let outcome = tokio::time::timeout(self.timeout, handler.invoke(input)).await;

        let result = match outcome {
            Ok(Ok(content)) => InvocationResult::ok(content),
            Ok(Err(error)) => {
                warn!(capability = %name, %error, "capability failed");
                InvocationResult::error(&error)
            }
            Err(_) => {
                let error = CapabilityError::Timeout {
                    name: name.to_string(),
                    seconds: self.timeout.as_secs(),
                };
                warn!(capability = %name, %error, "capability timed out");
                InvocationResult::error(&error)
            }
        };

        Ok(result)
    }
}
