//! The conversation state store: one ordered message history per persona
//! plus the active persona selection.
//!
//! The store is the only shared mutable state in the system. All mutation
//! goes through one mutex so appends stay strictly ordered even when a
//! late-arriving turn task and the input loop touch different personas at
//! the same time. Reads hand out cloned snapshots; callers never observe a
//! history mid-mutation.

use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input (typed or transcribed).
    User,
    /// Assistant (completion service) output.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single immutable conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

struct StoreInner {
    active: PersonaId,
    histories: HashMap<PersonaId, Vec<Message>>,
}

/// Per-persona conversation histories and the active persona selection.
pub struct ConversationStore {
    inner: Mutex<StoreInner>,
}

impl ConversationStore {
    /// Create an empty store with the given persona active.
    #[must_use]
    pub fn new(active: PersonaId) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                active,
                histories: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A poisoned lock only means a panicking thread held it; the data is
        // still a valid history map, so keep going.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of a persona's history, in insertion order.
    ///
    /// A persona that has never spoken yields an empty sequence.
    #[must_use]
    pub fn history(&self, persona: PersonaId) -> Vec<Message> {
        self.lock()
            .histories
            .get(&persona)
            .cloned()
            .unwrap_or_default()
    }

    /// Append a message to exactly one persona's history.
    pub fn append(&self, persona: PersonaId, message: Message) {
        self.lock()
            .histories
            .entry(persona)
            .or_default()
            .push(message);
    }

    /// Empty one persona's history; all others are untouched.
    pub fn clear(&self, persona: PersonaId) {
        self.lock().histories.remove(&persona);
    }

    /// Change the active persona. Pure selection change: no history is
    /// created, moved, or mutated.
    pub fn set_active(&self, persona: PersonaId) {
        self.lock().active = persona;
    }

    /// The currently active persona.
    #[must_use]
    pub fn active(&self) -> PersonaId {
        self.lock().active
    }

    /// Snapshot of the active persona's history.
    #[must_use]
    pub fn active_history(&self) -> Vec<Message> {
        let inner = self.lock();
        inner
            .histories
            .get(&inner.active)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn history_of_unused_persona_is_empty() {
        let store = ConversationStore::new(PersonaId::Jarvis);
        assert!(store.history(PersonaId::Edith).is_empty());
    }

    #[test]
    fn append_preserves_insertion_order() {
        let store = ConversationStore::new(PersonaId::Jarvis);
        store.append(PersonaId::Jarvis, Message::user("hello"));
        store.append(PersonaId::Jarvis, Message::assistant("hi there"));
        let history = store.history(PersonaId::Jarvis);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user("hello"));
        assert_eq!(history[1], Message::assistant("hi there"));
    }

    #[test]
    fn histories_are_isolated_per_persona() {
        let store = ConversationStore::new(PersonaId::Jarvis);
        store.append(PersonaId::Jarvis, Message::user("to jarvis"));
        store.append(PersonaId::Friday, Message::user("to friday"));
        assert_eq!(store.history(PersonaId::Jarvis).len(), 1);
        assert_eq!(store.history(PersonaId::Friday).len(), 1);
        assert!(store.history(PersonaId::Edith).is_empty());
    }

    #[test]
    fn clear_affects_only_the_named_persona() {
        let store = ConversationStore::new(PersonaId::Jarvis);
        store.append(PersonaId::Jarvis, Message::user("a"));
        store.append(PersonaId::Friday, Message::user("b"));
        store.clear(PersonaId::Jarvis);
        assert!(store.history(PersonaId::Jarvis).is_empty());
        assert_eq!(store.history(PersonaId::Friday).len(), 1);
    }

    #[test]
    fn set_active_does_not_touch_histories() {
        let store = ConversationStore::new(PersonaId::Jarvis);
        store.append(PersonaId::Jarvis, Message::user("a"));
        store.set_active(PersonaId::Friday);
        assert_eq!(store.active(), PersonaId::Friday);
        assert_eq!(store.history(PersonaId::Jarvis).len(), 1);
        assert!(store.active_history().is_empty());
    }

    #[test]
    fn snapshots_do_not_alias_the_store() {
        let store = ConversationStore::new(PersonaId::Jarvis);
        store.append(PersonaId::Jarvis, Message::user("a"));
        let mut snapshot = store.history(PersonaId::Jarvis);
        snapshot.push(Message::assistant("injected"));
        assert_eq!(store.history(PersonaId::Jarvis).len(), 1);
    }

    #[test]
    fn message_role_serde_is_lowercase() {
        let json = serde_json::to_string(&Message::user("hey")).unwrap();
        assert!(json.contains("\"user\""));
        let parsed: Message = serde_json::from_str("{\"role\":\"assistant\",\"content\":\"x\"}").unwrap();
        assert_eq!(parsed.role, Role::Assistant);
    }
}
