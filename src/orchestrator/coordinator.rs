//! The orchestrator event loop and turn handling.
//!
//! One task owns the state machine. Input events arrive on an unbounded
//! channel; the current [`OrchestratorStatus`] is published on a `watch`
//! channel and everything else the presentation layer needs travels as
//! [`RuntimeEvent`]s on a broadcast channel.
//!
//! Turn discipline:
//!
//! - Single turn at a time: submissions and capture activations are only
//!   accepted while idle. A rejection never disturbs an in-flight turn.
//! - Persona binding happens at submission time. The spawned turn task
//!   carries the bound persona, so a reply that arrives after the user has
//!   switched personas still lands in the history it belongs to.
//! - The user message is appended before the remote call is issued; the
//!   request context is the history *prior to* that append plus the new
//!   turn. On failure the user message intentionally stays in history.

use crate::capture::{CaptureOutcome, SpeechCapture};
use crate::completion::CompletionClient;
use crate::config::AuraConfig;
use crate::conversation::{ConversationStore, Message};
use crate::credentials::{self, CredentialManager, CredentialRef};
use crate::error::{AuraError, ErrorKind, Result};
use crate::orchestrator::messages::{InputEvent, OrchestratorStatus};
use crate::persona::{Persona, PersonaCatalog};
use crate::playback::SpeechPlayback;
use crate::runtime::RuntimeEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runtime event channel buffer size.
const EVENT_CHANNEL_SIZE: usize = 64;

/// How long to wait for the speaking signal to rise after `speak` before
/// concluding playback never started.
const SPEECH_START_GRACE: Duration = Duration::from_millis(750);

/// Orchestrates persona-scoped conversation turns.
pub struct Orchestrator {
    completion: Arc<dyn CompletionClient>,
    capture: Arc<dyn SpeechCapture>,
    playback: Arc<dyn SpeechPlayback>,
    credentials: Arc<dyn CredentialManager>,
    store: Arc<ConversationStore>,
    catalog: PersonaCatalog,
    api_key_ref: CredentialRef,
    poll_interval: Duration,
    input_tx: mpsc::UnboundedSender<InputEvent>,
    input_rx: Option<mpsc::UnboundedReceiver<InputEvent>>,
    status_tx: watch::Sender<OrchestratorStatus>,
    // Kept so the watch channel stays open even with no external observers.
    status_rx: watch::Receiver<OrchestratorStatus>,
    event_tx: broadcast::Sender<RuntimeEvent>,
    cancel: CancellationToken,
    capture_unsupported_reported: bool,
}

impl Orchestrator {
    /// Create a new orchestrator over the given store and boundary
    /// adapters.
    #[must_use]
    pub fn new(
        config: &AuraConfig,
        store: Arc<ConversationStore>,
        completion: Arc<dyn CompletionClient>,
        capture: Arc<dyn SpeechCapture>,
        playback: Arc<dyn SpeechPlayback>,
        credentials: Arc<dyn CredentialManager>,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(OrchestratorStatus::Idle);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            completion,
            capture,
            playback,
            credentials,
            store,
            catalog: PersonaCatalog::builtin(),
            api_key_ref: config.completion.api_key.clone(),
            poll_interval: Duration::from_millis(config.playback.poll_interval_ms),
            input_tx,
            input_rx: Some(input_rx),
            status_tx,
            status_rx,
            event_tx,
            cancel: CancellationToken::new(),
            capture_unsupported_reported: false,
        }
    }

    /// Sender for feeding input events to the orchestrator.
    #[must_use]
    pub fn input(&self) -> mpsc::UnboundedSender<InputEvent> {
        self.input_tx.clone()
    }

    /// Receiver tracking the orchestrator's status.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<OrchestratorStatus> {
        self.status_rx.clone()
    }

    /// Subscribe to runtime events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.event_tx.subscribe()
    }

    /// The persona catalog this orchestrator serves.
    #[must_use]
    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Get a clone of the cancellation token for external use.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Run the orchestrator until cancelled or the input channel closes.
    ///
    /// # Errors
    ///
    /// Returns an error if called twice on the same instance.
    pub async fn run(mut self) -> Result<()> {
        let mut input_rx = self
            .input_rx
            .take()
            .ok_or_else(|| AuraError::Channel("orchestrator is already running".to_owned()))?;

        info!(
            "conversation orchestrator started (persona: {})",
            self.store.active()
        );

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                event = input_rx.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event);
                }
            }
        }

        info!("conversation orchestrator stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Submit { text } => self.handle_submit(text),
            InputEvent::BeginCapture => self.handle_begin_capture(),
            InputEvent::EndCapture => self.capture.stop(),
            InputEvent::SelectPersona { persona } => {
                self.store.set_active(persona);
                self.emit(RuntimeEvent::PersonaSelected { persona });
            }
            InputEvent::ClearHistory => {
                let persona = self.store.active();
                self.store.clear(persona);
                self.emit(RuntimeEvent::HistoryCleared { persona });
            }
            InputEvent::Shutdown => self.cancel.cancel(),
        }
    }

    fn current_status(&self) -> OrchestratorStatus {
        *self.status_rx.borrow()
    }

    fn set_status(&self, status: OrchestratorStatus) {
        debug!("status -> {status}");
        let _ = self.status_tx.send(status);
    }

    fn emit(&self, event: RuntimeEvent) {
        let _ = self.event_tx.send(event);
    }

    fn report_error(&self, error: &AuraError) {
        warn!("{error}");
        self.emit(RuntimeEvent::Error {
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    /// Transition 3: `Idle -> Processing` for a typed or transcribed
    /// command.
    fn handle_submit(&mut self, text: String) {
        let text = text.trim().to_owned();
        if text.is_empty() {
            // Intentional no-op, not an error.
            debug!("ignoring empty submission");
            return;
        }

        let status = self.current_status();
        if status != OrchestratorStatus::Idle {
            self.report_error(&AuraError::Precondition(format!(
                "cannot submit while {status}; wait for the current turn to finish"
            )));
            return;
        }

        match credentials::resolve_completion_key(self.credentials.as_ref(), &self.api_key_ref) {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.report_error(&AuraError::Precondition(
                    "no completion credential configured; store one before submitting".to_owned(),
                ));
                return;
            }
            Err(e) => {
                self.report_error(&AuraError::Credential(e.to_string()));
                return;
            }
        }

        // Persona binding happens here, at submission time.
        let persona = *self.catalog.get(self.store.active());
        let prior = self.store.history(persona.id);
        self.store.append(persona.id, Message::user(text.clone()));
        self.emit(RuntimeEvent::UserTurn {
            persona: persona.id,
            text: text.clone(),
        });
        self.set_status(OrchestratorStatus::Processing);

        let turn = TurnTask {
            persona,
            text,
            prior,
            completion: Arc::clone(&self.completion),
            playback: Arc::clone(&self.playback),
            store: Arc::clone(&self.store),
            status_tx: self.status_tx.clone(),
            event_tx: self.event_tx.clone(),
            poll_interval: self.poll_interval,
            cancel: self.cancel.clone(),
        };
        tokio::spawn(turn.run());
    }

    /// Transition 1: `Idle -> Listening`.
    fn handle_begin_capture(&mut self) {
        if !self.capture.is_supported() {
            if !self.capture_unsupported_reported {
                self.capture_unsupported_reported = true;
                self.emit(RuntimeEvent::CaptureUnsupported);
                self.report_error(&AuraError::Precondition(
                    "speech capture is not supported on this system; use typed input".to_owned(),
                ));
            }
            return;
        }

        let status = self.current_status();
        if status != OrchestratorStatus::Idle {
            self.report_error(&AuraError::Precondition(format!(
                "cannot start listening while {status}"
            )));
            return;
        }

        let activation = match self.capture.start() {
            Ok(activation) => activation,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        self.set_status(OrchestratorStatus::Listening);

        let status_tx = self.status_tx.clone();
        let event_tx = self.event_tx.clone();
        let input_tx = self.input_tx.clone();
        tokio::spawn(async move {
            // Transition 2: `Listening -> Idle` on transcript, error, or
            // cancellation.
            match activation.outcome().await {
                CaptureOutcome::Transcript(text) => {
                    let _ = event_tx.send(RuntimeEvent::Transcription { text: text.clone() });
                    let _ = status_tx.send(OrchestratorStatus::Idle);
                    // A transcript is a typed submission by another name.
                    let _ = input_tx.send(InputEvent::Submit { text });
                }
                CaptureOutcome::Error(message) => {
                    let _ = event_tx.send(RuntimeEvent::Error {
                        kind: ErrorKind::Capture,
                        message,
                    });
                    let _ = status_tx.send(OrchestratorStatus::Idle);
                }
                CaptureOutcome::Cancelled => {
                    let _ = status_tx.send(OrchestratorStatus::Idle);
                }
            }
        });
    }
}

/// One in-flight conversation turn, bound to the persona that was active
/// when it was submitted.
struct TurnTask {
    persona: Persona,
    text: String,
    prior: Vec<Message>,
    completion: Arc<dyn CompletionClient>,
    playback: Arc<dyn SpeechPlayback>,
    store: Arc<ConversationStore>,
    status_tx: watch::Sender<OrchestratorStatus>,
    event_tx: broadcast::Sender<RuntimeEvent>,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl TurnTask {
    async fn run(self) {
        match self
            .completion
            .complete(self.persona.system_prompt, &self.prior, &self.text)
            .await
        {
            Ok(reply) => {
                // Transition 4: `Processing -> Speaking`. The reply lands in
                // the bound persona's history even if the active persona has
                // changed since submission.
                self.store
                    .append(self.persona.id, Message::assistant(reply.clone()));
                let _ = self.event_tx.send(RuntimeEvent::AssistantReply {
                    persona: self.persona.id,
                    text: reply.clone(),
                });
                // Hand the text to playback first: once Speaking is
                // observable, the speaking signal is already live.
                self.playback.speak(
                    &reply,
                    self.persona.synthesis_rate,
                    self.persona.synthesis_pitch,
                );
                let _ = self.status_tx.send(OrchestratorStatus::Speaking);
                wait_for_playback_end(self.playback.as_ref(), self.poll_interval, &self.cancel)
                    .await;
                // Transition 6: `Speaking -> Idle`.
                let _ = self.status_tx.send(OrchestratorStatus::Idle);
            }
            Err(e) => {
                // Transition 5: `Processing -> Idle`. The dangling user turn
                // stays in history for a context-aware retry.
                warn!("turn failed for {}: {e}", self.persona.id);
                let _ = self.event_tx.send(RuntimeEvent::Error {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                let _ = self.status_tx.send(OrchestratorStatus::Idle);
            }
        }
    }
}

/// Wait for playback to finish: event subscription when the adapter has
/// one, otherwise the fixed-interval poll of `is_speaking()`.
async fn wait_for_playback_end(
    playback: &dyn SpeechPlayback,
    poll_interval: Duration,
    cancel: &CancellationToken,
) {
    if let Some(mut signal) = playback.finished_signal() {
        // Bounded wait for speech to start; a speak that never started must
        // not wedge the state machine in Speaking.
        let started = tokio::time::timeout(SPEECH_START_GRACE, async {
            while !*signal.borrow_and_update() {
                if signal.changed().await.is_err() {
                    return false;
                }
            }
            true
        })
        .await
        .unwrap_or(false);
        if !started {
            return;
        }

        loop {
            tokio::select! {
                () = cancel.cancelled() => return,
                changed = signal.changed() => {
                    if changed.is_err() || !*signal.borrow_and_update() {
                        return;
                    }
                }
            }
        }
    } else {
        // Polling fallback: sample the best-effort signal until it drops.
        tokio::time::sleep(poll_interval).await;
        while playback.is_speaking() {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(poll_interval) => {}
            }
        }
    }
}
