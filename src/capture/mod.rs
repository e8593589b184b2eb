//! Speech capture boundary: turns one activation into at most one
//! transcript.
//!
//! The orchestrator treats a transcript as fully equivalent to a typed
//! submission, so the contract here is deliberately narrow: each activation
//! yields exactly one [`CaptureOutcome`] (transcript, error, or
//! cancellation) and then ends.

mod command;

pub use command::CommandCapture;

use crate::error::{AuraError, Result};
use tokio::sync::oneshot;

/// The single result of one capture activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A recognized transcript.
    Transcript(String),
    /// Recognition failed (device, permission, or recognizer error).
    Error(String),
    /// The activation was stopped before a transcript was produced.
    Cancelled,
}

/// Handle to one in-flight capture activation.
///
/// Await [`CaptureActivation::outcome`] for the activation's single result.
pub struct CaptureActivation {
    rx: oneshot::Receiver<CaptureOutcome>,
}

impl CaptureActivation {
    /// Wrap a receiver that will carry the activation's outcome.
    #[must_use]
    pub fn new(rx: oneshot::Receiver<CaptureOutcome>) -> Self {
        Self { rx }
    }

    /// Wait for the activation's outcome. An adapter that drops its sender
    /// without resolving counts as a capture error.
    pub async fn outcome(self) -> CaptureOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| CaptureOutcome::Error("capture ended without a result".to_owned()))
    }
}

/// Boundary contract for a platform speech-to-text facility.
pub trait SpeechCapture: Send + Sync {
    /// Whether capture can work on this system at all. When false, the
    /// capture entry point is reported unsupported once and disabled.
    fn is_supported(&self) -> bool;

    /// Begin one activation.
    ///
    /// # Errors
    ///
    /// Fails if capture is unsupported or an activation is already running.
    fn start(&self) -> Result<CaptureActivation>;

    /// Stop the current activation, if any. Idempotent; a stopped
    /// activation resolves with [`CaptureOutcome::Cancelled`].
    fn stop(&self);
}

/// Capture adapter for systems without a recognizer.
///
/// Always reports unsupported; `start` is a precondition failure.
pub struct UnsupportedCapture;

impl SpeechCapture for UnsupportedCapture {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&self) -> Result<CaptureActivation> {
        Err(AuraError::Precondition(
            "speech capture is not supported on this system".to_owned(),
        ))
    }

    fn stop(&self) {}
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn dropped_sender_surfaces_as_error() {
        let (tx, rx) = oneshot::channel();
        drop(tx);
        let outcome = CaptureActivation::new(rx).outcome().await;
        assert!(matches!(outcome, CaptureOutcome::Error(_)));
    }

    #[test]
    fn unsupported_capture_rejects_start() {
        let capture = UnsupportedCapture;
        assert!(!capture.is_supported());
        assert!(matches!(
            capture.start(),
            Err(AuraError::Precondition(_))
        ));
        capture.stop();
    }
}
