//! Playback adapter wrapping an external synthesizer command.
//!
//! The command is run through the shell once per utterance with `{rate}`
//! and `{pitch}` substituted; the utterance text is written to its stdin so
//! no quoting of user text ever reaches the shell.

use super::SpeechPlayback;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Runs a configured synthesizer command per utterance.
pub struct CommandPlayback {
    command: String,
    speaking: Arc<AtomicBool>,
    signal: watch::Sender<bool>,
}

impl CommandPlayback {
    /// Create a playback adapter around the given shell command template.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            command: command.into(),
            speaking: Arc::new(AtomicBool::new(false)),
            signal,
        }
    }
}

impl SpeechPlayback for CommandPlayback {
    fn speak(&self, text: &str, rate: f32, pitch: f32) {
        let command = self
            .command
            .replace("{rate}", &format!("{rate}"))
            .replace("{pitch}", &format!("{pitch}"));
        let text = text.to_owned();

        self.speaking.store(true, Ordering::SeqCst);
        let _ = self.signal.send(true);

        let speaking = Arc::clone(&self.speaking);
        let signal = self.signal.clone();
        tokio::spawn(async move {
            if let Err(e) = synthesize(&command, &text).await {
                warn!("playback command failed: {e}");
            }
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

async fn synthesize(command: &str, text: &str) -> std::io::Result<()> {
    let mut child = tokio::process::Command::new("/bin/sh")
        .arg("-lc")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
        // Close stdin so the synthesizer sees end of input.
        drop(stdin);
    }

    let status = child.wait().await?;
    debug!("playback command exited with {status}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn speaking_signal_rises_and_falls() {
        // `cat` consumes the utterance from stdin and exits.
        let playback = CommandPlayback::new("cat > /dev/null");
        let mut signal = playback.finished_signal().unwrap();
        playback.speak("hello there", 0.95, 0.8);
        assert!(playback.is_speaking());
        while *signal.borrow_and_update() {
            signal.changed().await.unwrap();
        }
        assert!(!playback.is_speaking());
    }

    #[tokio::test]
    async fn rate_and_pitch_are_substituted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("args.txt");
        let playback = CommandPlayback::new(format!(
            "printf '%s %s' {{rate}} {{pitch}} > {} && cat > /dev/null",
            out.display()
        ));
        let mut signal = playback.finished_signal().unwrap();
        playback.speak("check", 0.9, 1.1);
        while *signal.borrow_and_update() {
            signal.changed().await.unwrap();
        }
        let recorded = std::fs::read_to_string(&out).unwrap();
        assert_eq!(recorded, "0.9 1.1");
    }
}
