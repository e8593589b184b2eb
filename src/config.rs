//! Configuration types for the conversation orchestrator.

use crate::credentials::CredentialRef;
use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuraConfig {
    /// Persona active at startup.
    pub default_persona: PersonaId,
    /// Remote completion service settings.
    pub completion: CompletionConfig,
    /// Speech capture settings.
    pub capture: CaptureConfig,
    /// Speech playback settings.
    pub playback: PlaybackConfig,
}

/// Remote completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,
    /// Model identifier sent with each request.
    pub api_model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum reply length in tokens.
    pub max_tokens: u32,
    /// Bound on each remote call; expiry is a remote-call failure.
    pub request_timeout_secs: u64,
    /// API credential. `None` here falls back to the platform keyring slot.
    pub api_key: CredentialRef,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_owned(),
            api_model: "gpt-4o-mini".to_owned(),
            temperature: 0.7,
            max_tokens: 150,
            request_timeout_secs: 30,
            api_key: CredentialRef::None,
        }
    }
}

/// Speech capture configuration.
///
/// Capture wraps an external recognizer command that prints one transcript
/// to stdout per invocation. With no command configured, capture reports
/// itself unsupported and the voice entry point is disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Recognizer command, run via the shell. Its trimmed stdout is the
    /// transcript.
    pub command: Option<String>,
}

/// Speech playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Synthesizer command, run via the shell with `{rate}` and `{pitch}`
    /// substituted; the utterance text is written to its stdin. With no
    /// command configured, playback is silent but still drives the speaking
    /// phase.
    pub command: Option<String>,
    /// Poll interval for the speaking signal when the playback adapter has
    /// no end-of-speech event.
    pub poll_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            command: None,
            poll_interval_ms: 100,
        }
    }
}

impl AuraConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::AuraError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot
    /// be serialized.
    pub fn save_to_file(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AuraError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = AuraConfig::default();
        assert_eq!(config.completion.api_model, "gpt-4o-mini");
        assert!((config.completion.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.completion.max_tokens, 150);
        assert_eq!(config.completion.request_timeout_secs, 30);
        assert_eq!(config.playback.poll_interval_ms, 100);
        assert_eq!(config.default_persona, PersonaId::Jarvis);
        assert!(config.capture.command.is_none());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AuraConfig::default();
        config.completion.api_model = "gpt-4o".to_owned();
        config.default_persona = PersonaId::Edith;
        config.save_to_file(&path).unwrap();

        let loaded = AuraConfig::from_file(&path).unwrap();
        assert_eq!(loaded.completion.api_model, "gpt-4o");
        assert_eq!(loaded.default_persona, PersonaId::Edith);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AuraConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        assert!(matches!(
            AuraConfig::from_file(&path),
            Err(crate::error::AuraError::Config(_))
        ));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        let config = AuraConfig::from_file(&path).unwrap();
        assert_eq!(config.completion.api_model, "gpt-4o-mini");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[completion]\napi_model = \"gpt-4o\"\n").unwrap();
        let config = AuraConfig::from_file(&path).unwrap();
        assert_eq!(config.completion.api_model, "gpt-4o");
        assert_eq!(config.completion.max_tokens, 150);
    }
}
