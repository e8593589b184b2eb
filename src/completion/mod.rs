//! Completion client boundary: one persona-scoped message list in, one
//! reply string out.
//!
//! Single attempt, no automatic retry; all recovery is user-initiated
//! resubmission. Streaming is deliberately out of scope.

mod openai;

pub use openai::{OpenAiCompletionClient, build_chat_request};

use crate::conversation::Message;
use crate::error::Result;
use async_trait::async_trait;

/// Boundary contract for the remote language-model completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request one reply for the new user turn, given the persona's system
    /// prompt and the conversation so far.
    ///
    /// # Errors
    ///
    /// Fails with a descriptive error on transport failure, non-success
    /// responses, malformed or empty replies, or timeout.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Message],
        new_turn: &str,
    ) -> Result<String>;
}
