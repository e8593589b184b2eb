//! Input events consumed by the orchestrator and the status it publishes.

use crate::persona::PersonaId;

/// The orchestrator's mutually exclusive phase.
///
/// Exactly one value holds at any instant from the orchestrator's
/// perspective. `Speaking` is inferred from the playback adapter's
/// best-effort signal rather than owned exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorStatus {
    /// Ready for input.
    #[default]
    Idle,
    /// A capture activation is waiting for a transcript.
    Listening,
    /// A completion request is in flight.
    Processing,
    /// The reply is being rendered to speech.
    Speaking,
}

impl std::fmt::Display for OrchestratorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Processing => write!(f, "processing"),
            Self::Speaking => write!(f, "speaking"),
        }
    }
}

/// Raw input events fed to the orchestrator.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// A command string, typed or transcribed. Whitespace-only text is a
    /// silent no-op.
    Submit {
        /// The command text.
        text: String,
    },
    /// Activate the speech capture adapter.
    BeginCapture,
    /// Stop the current capture activation, if any. Idempotent.
    EndCapture,
    /// Change the active persona. Permitted in any state; only redirects
    /// where the *next* turn reads from and writes to.
    SelectPersona {
        /// The persona to activate.
        persona: PersonaId,
    },
    /// Empty the active persona's history.
    ClearHistory,
    /// Stop the orchestrator.
    Shutdown,
}
