//! Speech playback boundary.
//!
//! `speak` is fire-and-forget: the orchestrator never suspends on playback.
//! End-of-speech is observed either through the adapter's finished signal
//! (preferred) or by polling `is_speaking()` on a fixed interval; both
//! strategies sit behind this one trait so the orchestrator does not care
//! which the adapter provides.

mod command;

pub use command::CommandPlayback;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Boundary contract for a text-to-speech capability.
pub trait SpeechPlayback: Send + Sync {
    /// Render text to audible speech. Fire-and-forget: returns immediately,
    /// synthesis and playback proceed in the background.
    fn speak(&self, text: &str, rate: f32, pitch: f32);

    /// Best-effort "currently speaking" signal.
    fn is_speaking(&self) -> bool;

    /// End-of-speech event subscription: a receiver whose value tracks
    /// `is_speaking()`. Adapters without one return `None`, selecting the
    /// polling fallback.
    fn finished_signal(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}

/// Playback adapter with no audio output.
///
/// Still models a speaking window proportional to the utterance length so
/// the speaking phase of the state machine is exercised end to end.
pub struct SilentPlayback {
    speaking: Arc<AtomicBool>,
    signal: watch::Sender<bool>,
}

/// Simulated speaking pace for the silent adapter.
const SILENT_MS_PER_WORD: u64 = 120;

impl SilentPlayback {
    /// Create a silent playback adapter.
    #[must_use]
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            speaking: Arc::new(AtomicBool::new(false)),
            signal,
        }
    }
}

impl Default for SilentPlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechPlayback for SilentPlayback {
    fn speak(&self, text: &str, _rate: f32, _pitch: f32) {
        let words = text.split_whitespace().count().max(1) as u64;
        let duration = Duration::from_millis(words * SILENT_MS_PER_WORD);
        self.speaking.store(true, Ordering::SeqCst);
        let _ = self.signal.send(true);
        let speaking = Arc::clone(&self.speaking);
        let signal = self.signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            speaking.store(false, Ordering::SeqCst);
            let _ = signal.send(false);
        });
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn finished_signal(&self) -> Option<watch::Receiver<bool>> {
        Some(self.signal.subscribe())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn silent_playback_speaks_then_finishes() {
        let playback = SilentPlayback::new();
        let mut signal = playback.finished_signal().unwrap();
        playback.speak("one two", 1.0, 1.0);
        assert!(playback.is_speaking());
        // Wait for the signal to drop back to false.
        while *signal.borrow_and_update() {
            signal.changed().await.unwrap();
        }
        assert!(!playback.is_speaking());
    }
}
