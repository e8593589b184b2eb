//! Error types for the aura conversation core.

/// Classification used when surfacing failures to the presentation layer.
///
/// Mirrors the recovery contract: precondition failures are never retried,
/// capture and remote-call failures return the orchestrator to idle and the
/// user retries manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required precondition was not met (missing credential, unsupported
    /// capture, busy orchestrator). Nothing was mutated.
    Precondition,
    /// Speech capture failed (device, permission, or recognizer error).
    Capture,
    /// The remote completion call failed (transport, non-success response,
    /// malformed or empty reply, timeout).
    RemoteCall,
    /// Anything else (I/O, channel wiring, playback plumbing).
    Internal,
}

/// Top-level error type for the conversation system.
#[derive(Debug, thiserror::Error)]
pub enum AuraError {
    /// A required precondition failed; the request was rejected up front.
    #[error("{0}")]
    Precondition(String),

    /// Speech capture error.
    #[error("capture error: {0}")]
    Capture(String),

    /// Remote completion service error.
    #[error("completion error: {0}")]
    Completion(String),

    /// Speech playback error.
    #[error("playback error: {0}")]
    Playback(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("credential error: {0}")]
    Credential(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

impl AuraError {
    /// Map this error onto the reporting taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::Capture(_) => ErrorKind::Capture,
            Self::Completion(_) => ErrorKind::RemoteCall,
            Self::Playback(_) | Self::Config(_) | Self::Credential(_) | Self::Io(_)
            | Self::Channel(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AuraError>;
