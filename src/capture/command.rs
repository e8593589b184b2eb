//! Capture adapter wrapping an external recognizer command.
//!
//! The command is run through the shell once per activation; its trimmed
//! stdout is the transcript. This keeps the recognizer itself (platform
//! dictation tool, local STT binary, test stub) outside the process.

use super::{CaptureActivation, CaptureOutcome, SpeechCapture};
use crate::error::{AuraError, Result};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs a configured recognizer command per activation.
pub struct CommandCapture {
    command: String,
    active: Arc<AtomicBool>,
    current: Mutex<Option<CancellationToken>>,
}

impl CommandCapture {
    /// Create a capture adapter around the given shell command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            active: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(None),
        }
    }
}

impl SpeechCapture for CommandCapture {
    fn is_supported(&self) -> bool {
        !self.command.trim().is_empty()
    }

    fn start(&self) -> Result<CaptureActivation> {
        if !self.is_supported() {
            return Err(AuraError::Precondition(
                "no recognizer command configured".to_owned(),
            ));
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(AuraError::Capture("capture is already active".to_owned()));
        }

        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        if let Ok(mut current) = self.current.lock() {
            *current = Some(cancel.clone());
        }

        let command = self.command.clone();
        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                () = cancel.cancelled() => CaptureOutcome::Cancelled,
                result = run_recognizer(&command) => match result {
                    Ok(text) if !text.is_empty() => CaptureOutcome::Transcript(text),
                    Ok(_) => CaptureOutcome::Error("recognizer produced no transcript".to_owned()),
                    Err(e) => CaptureOutcome::Error(e.to_string()),
                },
            };
            active.store(false, Ordering::SeqCst);
            debug!(?outcome, "capture activation resolved");
            let _ = tx.send(outcome);
        });

        Ok(CaptureActivation::new(rx))
    }

    fn stop(&self) {
        if let Ok(mut current) = self.current.lock()
            && let Some(token) = current.take()
        {
            token.cancel();
        }
    }
}

async fn run_recognizer(command: &str) -> Result<String> {
    let output = tokio::process::Command::new("/bin/sh")
        .arg("-lc")
        .arg(command)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| AuraError::Capture(format!("failed to run recognizer: {e}")))?;

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map_or_else(|| "unknown".to_owned(), |c| c.to_string());
        warn!("recognizer exited with status {code}");
        return Err(AuraError::Capture(format!(
            "recognizer exited with status {code}"
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}
