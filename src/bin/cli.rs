//! Interactive console front-end for aura.
//!
//! Renders the orchestrator's presentation signals (status, runtime events,
//! the active persona's history) and feeds it typed submissions and slash
//! commands. Logs go to a daily-rotated file so stdout stays clean for the
//! conversation.

use anyhow::Context;
use aura::capture::{CommandCapture, SpeechCapture, UnsupportedCapture};
use aura::completion::OpenAiCompletionClient;
use aura::credentials::{self, CredentialManager};
use aura::orchestrator::{InputEvent, Orchestrator, OrchestratorStatus};
use aura::playback::{CommandPlayback, SilentPlayback, SpeechPlayback};
use aura::{AuraConfig, ConversationStore, PersonaId, RuntimeEvent};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Aura: persona-scoped voice conversation orchestrator.
#[derive(Parser)]
#[command(name = "aura", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // File logging: stdout belongs to the conversation.
    let file_appender = tracing_appender::rolling::daily(aura::app_dirs::logs_dir(), "aura.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aura=info")),
        )
        .with_writer(file_writer)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => AuraConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            let default_path = AuraConfig::default_config_path();
            if default_path.exists() {
                AuraConfig::from_file(&default_path)
                    .with_context(|| format!("failed to load {}", default_path.display()))?
            } else {
                AuraConfig::default()
            }
        }
    };

    run(config).await
}

async fn run(config: AuraConfig) -> anyhow::Result<()> {
    let credentials: Arc<dyn CredentialManager> = Arc::from(credentials::create_manager());
    let store = Arc::new(ConversationStore::new(config.default_persona));

    let completion = Arc::new(OpenAiCompletionClient::new(
        &config.completion,
        Arc::clone(&credentials),
    )?);
    let capture: Arc<dyn SpeechCapture> = match config.capture.command.as_deref() {
        Some(command) if !command.trim().is_empty() => Arc::new(CommandCapture::new(command)),
        _ => Arc::new(UnsupportedCapture),
    };
    let playback: Arc<dyn SpeechPlayback> = match config.playback.command.as_deref() {
        Some(command) if !command.trim().is_empty() => Arc::new(CommandPlayback::new(command)),
        _ => Arc::new(SilentPlayback::new()),
    };

    let orchestrator = Orchestrator::new(
        &config,
        Arc::clone(&store),
        completion,
        capture,
        playback,
        Arc::clone(&credentials),
    );
    let catalog = orchestrator.catalog().clone();
    let input = orchestrator.input();
    let mut status = orchestrator.status();
    let mut events = orchestrator.events();
    let cancel = orchestrator.cancel_token();

    // Handle Ctrl+C.
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_clone.cancel();
        }
    });

    // Render runtime events.
    let event_cancel = cancel.clone();
    let event_catalog = catalog.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = event_cancel.cancelled() => break,
                event = events.recv() => {
                    let Ok(event) = event else { break };
                    render_event(&event_catalog, &event);
                }
            }
        }
    });

    // Render status transitions.
    let status_cancel = cancel.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = status_cancel.cancelled() => break,
                changed = status.changed() => {
                    if changed.is_err() { break; }
                    let current = *status.borrow_and_update();
                    println!("  [{}]", status_label(current));
                }
            }
        }
    });

    let active = catalog.get(store.active());
    println!("Aura v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Talking to {} — {}. Type a command, or /help for options.\n",
        active.display_name, active.subtitle
    );

    let orchestrator_handle = tokio::spawn(orchestrator.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };
        let Some(line) = line.context("failed to read input")? else {
            break;
        };
        let line = line.trim().to_owned();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('/') {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let command = parts.next().unwrap_or_default();
            let argument = parts.next().unwrap_or_default().trim();
            match command {
                "persona" => match PersonaId::from_name(argument) {
                    Some(persona) => {
                        let _ = input.send(InputEvent::SelectPersona { persona });
                    }
                    None => print_personas(&catalog),
                },
                "personas" => print_personas(&catalog),
                "history" => {
                    let active = catalog.get(store.active());
                    for message in store.active_history() {
                        let speaker = match message.role {
                            aura::Role::User => "you",
                            aura::Role::Assistant => active.display_name,
                        };
                        println!("{speaker}: {}", message.content);
                    }
                }
                "clear" => {
                    let _ = input.send(InputEvent::ClearHistory);
                }
                "key" => {
                    if argument.is_empty() {
                        println!("usage: /key <token>");
                    } else {
                        match credentials.store(aura::credentials::COMPLETION_API_KEY_ACCOUNT, argument)
                        {
                            Ok(_) => println!("credential stored"),
                            Err(e) => println!("error: {e}"),
                        }
                    }
                }
                "listen" => {
                    let _ = input.send(InputEvent::BeginCapture);
                }
                "stop" => {
                    let _ = input.send(InputEvent::EndCapture);
                }
                "quit" | "exit" => {
                    let _ = input.send(InputEvent::Shutdown);
                    break;
                }
                "help" => print_help(),
                other => println!("unknown command: /{other} (try /help)"),
            }
        } else {
            let _ = input.send(InputEvent::Submit { text: line });
        }
    }

    cancel.cancel();
    orchestrator_handle.await.context("orchestrator task panicked")??;
    Ok(())
}

fn render_event(catalog: &aura::PersonaCatalog, event: &RuntimeEvent) {
    match event {
        RuntimeEvent::Transcription { text } => println!("you (voice): {text}"),
        RuntimeEvent::AssistantReply { persona, text } => {
            println!("{}: {text}", catalog.get(*persona).display_name);
        }
        RuntimeEvent::PersonaSelected { persona } => {
            let persona = catalog.get(*persona);
            println!("now talking to {} — {}", persona.display_name, persona.subtitle);
        }
        RuntimeEvent::HistoryCleared { persona } => {
            println!("{} history cleared", catalog.get(*persona).display_name);
        }
        RuntimeEvent::CaptureUnsupported => {
            println!("voice input is unavailable; /listen is disabled");
        }
        RuntimeEvent::Error { message, .. } => println!("error: {message}"),
        RuntimeEvent::UserTurn { .. } => {}
    }
}

fn status_label(status: OrchestratorStatus) -> &'static str {
    match status {
        OrchestratorStatus::Idle => "READY",
        OrchestratorStatus::Listening => "LISTENING...",
        OrchestratorStatus::Processing => "PROCESSING...",
        OrchestratorStatus::Speaking => "SPEAKING...",
    }
}

fn print_personas(catalog: &aura::PersonaCatalog) {
    println!("available personas:");
    for persona in catalog.all() {
        println!("  {} — {}", persona.id, persona.subtitle);
    }
}

fn print_help() {
    println!("commands:");
    println!("  /persona <name>  switch the active persona");
    println!("  /personas        list personas");
    println!("  /history         show the active persona's conversation");
    println!("  /clear           clear the active persona's conversation");
    println!("  /key <token>     store the completion service credential");
    println!("  /listen          start voice capture");
    println!("  /stop            stop voice capture");
    println!("  /quit            exit");
    println!("anything else is sent to the active persona.");
}
