//! Error types for docent-rs.
//!
//! Errors are split by domain: indexing, capability registry, capability
//! invocation, agent/provider transport, and the CLI command surface.
//! The CLI-level [`CommandError`] aggregates the domain errors via `#[from]`
//! conversions, and the crate-wide [`Result`] alias defaults to it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from building, loading, or persisting the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The source document path does not exist.
    #[error("source document not found: {path}")]
    SourceNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// Invalid chunk geometry (chunk size must exceed overlap).
    #[error("invalid chunk geometry: chunk_size={chunk_size} must be greater than chunk_overlap={chunk_overlap}")]
    InvalidGeometry {
        /// Configured chunk size in graphemes.
        chunk_size: usize,
        /// Configured overlap in graphemes.
        chunk_overlap: usize,
    },

    /// Index build failed (embedding computation or persistence).
    ///
    /// No partial index is left on disk when this is returned.
    #[error("index build failed: {message}")]
    Build {
        /// What went wrong.
        message: String,
    },

    /// Text extraction from the source document failed.
    #[error("text extraction failed: {message}")]
    Extraction {
        /// Extractor error detail.
        message: String,
    },

    /// The persisted index was built with a different embedding model.
    #[error(
        "embedding model mismatch: index was built with '{persisted}' but \
         '{configured}' is configured (delete the index directory to rebuild)"
    )]
    ModelMismatch {
        /// Model name recorded in the persisted index.
        persisted: String,
        /// Model name in the current configuration.
        configured: String,
    },

    /// SQLite storage error.
    #[error("index storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem I/O error.
    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from capability registration and lookup.
///
/// Both variants are programming errors raised at wiring time, not
/// per-message runtime failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A capability with this name is already registered.
    #[error("duplicate capability: '{name}' is already registered")]
    DuplicateCapability {
        /// Conflicting capability name.
        name: String,
    },

    /// No capability with this name is registered.
    #[error("unknown capability: '{name}'")]
    UnknownCapability {
        /// Requested capability name.
        name: String,
    },
}

/// Errors from invoking a single capability.
///
/// These never abort the orchestration loop; the registry converts them
/// into failure-observation strings for the routing model.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// Network-level failure reaching the capability's backend.
    #[error("network error calling capability '{name}': {message}")]
    Network {
        /// Capability name.
        name: String,
        /// Transport error detail.
        message: String,
    },

    /// The capability's backend returned a non-2xx HTTP status.
    #[error("capability '{name}' returned HTTP {status}")]
    Status {
        /// Capability name.
        name: String,
        /// HTTP status code.
        status: u16,
    },

    /// The capability did not complete within the configured timeout.
    #[error("capability '{name}' timed out after {seconds}s")]
    Timeout {
        /// Capability name.
        name: String,
        /// Timeout that was exceeded.
        seconds: u64,
    },

    /// The capability's backend returned an unusable response body.
    #[error("capability '{name}' returned an invalid response: {message}")]
    InvalidResponse {
        /// Capability name.
        name: String,
        /// Parse or validation detail.
        message: String,
    },
}

/// Errors from the agent layer: provider transport, routing decisions,
/// and configuration.
#[derive(Debug, Error)]
pub enum AgentError {
    /// API request to the model provider failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error message from the provider or transport.
        message: String,
        /// HTTP status code, when available.
        status: Option<u16>,
    },

    /// The routing model's output could not be parsed into a decision.
    ///
    /// Recovered in-loop: counts against the iteration budget and triggers
    /// a corrective re-prompt.
    #[error("routing decision parse failed: {message}")]
    RoutingParse {
        /// Parse failure detail.
        message: String,
        /// The raw model output, for diagnostics.
        content: String,
    },

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// Invalid assistant configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Validation failure detail.
        message: String,
    },
}

/// Top-level CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Index build/load failure.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Capability registration failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Agent or provider failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Command execution failure not covered by a domain error.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Output formatting failure.
    #[error("output format error: {0}")]
    OutputFormat(String),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias, defaulting to [`CommandError`].
pub type Result<T, E = CommandError> = std::result::Result<T, E>;
