//! Runtime events emitted by the orchestrator for UI and observability.
//!
//! Deliberately lightweight so the orchestrator can emit events without
//! blocking turn handling; slow consumers lag on the broadcast channel
//! instead of stalling the core.

use crate::error::ErrorKind;
use crate::persona::PersonaId;

/// Events that describe what the orchestrator is doing "right now".
///
/// The status enum itself travels on a dedicated `watch` channel; these
/// events carry everything else the presentation layer renders.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A transcript was recognized from speech capture. The same text is
    /// submitted as a turn immediately afterwards.
    Transcription {
        /// The recognized text.
        text: String,
    },
    /// A user turn was accepted and appended to a persona's history.
    UserTurn {
        /// The persona the turn was bound to at submission time.
        persona: PersonaId,
        /// The submitted text.
        text: String,
    },
    /// The completion service replied; the text was appended and handed to
    /// playback.
    AssistantReply {
        /// The persona the reply belongs to (submission-time binding).
        persona: PersonaId,
        /// The reply text.
        text: String,
    },
    /// The active persona changed.
    PersonaSelected {
        /// The newly active persona.
        persona: PersonaId,
    },
    /// A persona's history was cleared.
    HistoryCleared {
        /// The persona whose history was emptied.
        persona: PersonaId,
    },
    /// Speech capture is unavailable on this system. Emitted at most once;
    /// the capture control should be disabled in response.
    CaptureUnsupported,
    /// A failure was surfaced to the user.
    Error {
        /// Where the failure sits in the recovery taxonomy.
        kind: ErrorKind,
        /// Human-readable description, including the remote service's own
        /// message when one was available.
        message: String,
    },
}
