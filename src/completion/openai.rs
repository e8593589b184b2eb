//! Chat-completions client for OpenAI-compatible endpoints.
//!
//! Non-streaming: one POST per turn, one reply string back. The request
//! carries the persona's system prompt, the conversation so far, and the
//! new user turn as an ordered `{role, content}` list, plus model selection
//! and sampling parameters.

use super::CompletionClient;
use crate::config::CompletionConfig;
use crate::conversation::{Message, Role};
use crate::credentials::{self, CredentialManager, CredentialRef};
use crate::error::{AuraError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Completion client for the chat-completions wire protocol.
pub struct OpenAiCompletionClient {
    http: reqwest::Client,
    api_url: String,
    api_model: String,
    temperature: f64,
    max_tokens: u32,
    api_key: CredentialRef,
    credentials: Arc<dyn CredentialManager>,
}

impl OpenAiCompletionClient {
    /// Build a client from configuration.
    ///
    /// The credential is resolved at request time, not here, so a token
    /// stored after startup is picked up without restarting.
    ///
    /// # Errors
    ///
    /// Returns a config error if the HTTP client cannot be constructed.
    pub fn new(
        config: &CompletionConfig,
        credentials: Arc<dyn CredentialManager>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AuraError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_model: config.api_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key: config.api_key.clone(),
            credentials,
        })
    }
}

/// Build the JSON request body: system prompt, then the conversation so
/// far, then the new user turn.
#[must_use]
pub fn build_chat_request(
    model: &str,
    system_prompt: &str,
    history: &[Message],
    new_turn: &str,
    temperature: f64,
    max_tokens: u32,
) -> serde_json::Value {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(serde_json::json!({
        "role": "system",
        "content": system_prompt,
    }));
    for message in history {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        messages.push(serde_json::json!({
            "role": role,
            "content": message.content,
        }));
    }
    messages.push(serde_json::json!({
        "role": "user",
        "content": new_turn,
    }));

    serde_json::json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "max_tokens": max_tokens,
    })
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Message],
        new_turn: &str,
    ) -> Result<String> {
        let api_key = credentials::resolve_completion_key(self.credentials.as_ref(), &self.api_key)
            .map_err(|e| AuraError::Credential(e.to_string()))?
            .ok_or_else(|| {
                AuraError::Precondition("no completion credential configured".to_owned())
            })?;

        let body = build_chat_request(
            &self.api_model,
            system_prompt,
            history,
            new_turn,
            self.temperature,
            self.max_tokens,
        );

        let request_id = Uuid::new_v4();
        debug!(%request_id, model = %self.api_model, turns = history.len(), "sending completion request");

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuraError::Completion(format!("completion request timed out: {e}"))
                } else {
                    AuraError::Completion(format!("completion request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .map_or_else(
                    || format!("completion service returned {status}"),
                    |detail| detail.message,
                );
            debug!(%request_id, %status, "completion request rejected");
            return Err(AuraError::Completion(message));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AuraError::Completion(format!("malformed completion response: {e}")))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(AuraError::Completion(
                "completion response contained no reply".to_owned(),
            ));
        }

        debug!(%request_id, chars = reply.len(), "completion reply received");
        Ok(reply)
    }
}
