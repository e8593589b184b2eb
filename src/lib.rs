//! Aura: persona-scoped voice conversation orchestrator.
//!
//! A user addresses one of several named personas, each with its own
//! personality prompt and synthetic voice, and gets spoken and textual
//! replies from a remote completion service.
//!
//! # Architecture
//!
//! The core is an event-driven state machine over async boundary adapters:
//! - **Capture**: external speech-to-text, one transcript per activation
//! - **Completion**: remote chat-completions endpoint via `reqwest`
//! - **Playback**: external text-to-speech, fire-and-forget with an
//!   end-of-speech signal
//! - **Store**: one ordered message history per persona
//!
//! Input events (typed text or transcripts) flow into the
//! [`orchestrator::Orchestrator`], which binds each turn to the persona
//! active at submission time, appends the user message before issuing the
//! remote call, and drives status `Idle -> Processing -> Speaking -> Idle`.

pub mod app_dirs;
pub mod capture;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod persona;
pub mod playback;
pub mod runtime;

pub use config::AuraConfig;
pub use conversation::{ConversationStore, Message, Role};
pub use error::{AuraError, ErrorKind, Result};
pub use orchestrator::{InputEvent, Orchestrator, OrchestratorStatus};
pub use persona::{Persona, PersonaCatalog, PersonaId};
pub use runtime::RuntimeEvent;
