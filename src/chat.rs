//! Persona chat threads.
//!
//! This module provides in-memory storage for the chat widget: each thread
//! holds the full message history of one visitor conversation with the
//! owner's persona. Threads are identified by UUID.
//!
//! # Example
//!
//! ```rust
//! use folio_studio::chat::ChatStore;
//!
//! let store = ChatStore::new();
//! let thread = store.create();
//! thread.add_user_message("Hey, what are you working on?");
//!
//! assert_eq!(thread.message_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{Turn, TurnRole};

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Visitor message.
    User,
    /// Persona reply.
    Assistant,
}

/// A message in a chat thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a visitor message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create a persona reply.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single chat conversation.
#[derive(Debug)]
pub struct ChatThread {
    inner: Arc<ThreadInner>,
}

#[derive(Debug)]
struct ThreadInner {
    /// Unique thread identifier.
    id: String,
    /// Conversation messages.
    messages: RwLock<Vec<ChatMessage>>,
    /// Thread creation time.
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl Clone for ChatThread {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ChatThread {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(ThreadInner {
                id,
                messages: RwLock::new(Vec::new()),
                created_at: Utc::now(),
            }),
        }
    }

    /// Get the thread ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Add a visitor message.
    pub fn add_user_message(&self, content: impl Into<String>) {
        self.add_message(ChatMessage::user(content));
    }

    /// Add a persona reply.
    pub fn add_assistant_message(&self, content: impl Into<String>) {
        self.add_message(ChatMessage::assistant(content));
    }

    /// Add a message to the conversation.
    pub fn add_message(&self, message: ChatMessage) {
        let mut guard = self.inner.messages.write().unwrap();
        guard.push(message);
    }

    /// Get all messages in the conversation.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.messages.read().unwrap().clone()
    }

    /// Get the number of messages in the conversation.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner.messages.read().unwrap().len()
    }

    /// Map the conversation to driver turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.messages()
            .into_iter()
            .map(|m| Turn {
                role: match m.role {
                    ChatRole::User => TurnRole::User,
                    ChatRole::Assistant => TurnRole::Model,
                },
                text: m.content,
            })
            .collect()
    }
}

/// Thread-safe store for chat threads.
#[derive(Debug, Clone)]
pub struct ChatStore {
    inner: Arc<RwLock<HashMap<String, ChatThread>>>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore {
    /// Create a new chat store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new thread and return it.
    #[must_use]
    pub fn create(&self) -> ChatThread {
        let id = Uuid::new_v4().to_string();
        let thread = ChatThread::new(id.clone());
        let mut guard = self.inner.write().unwrap();
        guard.insert(id, thread.clone());
        thread
    }

    /// Get a thread by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ChatThread> {
        let guard = self.inner.read().unwrap();
        guard.get(id).cloned()
    }

    /// Get a thread by ID, creating a fresh one if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: Option<&str>) -> ChatThread {
        if let Some(id) = id
            && let Some(thread) = self.get(id)
        {
            return thread;
        }
        self.create()
    }

    /// Get the number of threads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check if there are no threads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_lifecycle() {
        let thread = ChatThread::new("test-123".to_string());

        assert_eq!(thread.id(), "test-123");
        assert_eq!(thread.message_count(), 0);

        thread.add_user_message("Hello");
        assert_eq!(thread.message_count(), 1);

        thread.add_assistant_message("Hi there!");
        assert_eq!(thread.message_count(), 2);

        let messages = thread.messages();
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_chat_store() {
        let store = ChatStore::new();

        assert!(store.is_empty());

        let thread = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(thread.id()).unwrap();
        assert_eq!(retrieved.id(), thread.id());

        // Clones share the same conversation.
        retrieved.add_user_message("shared");
        assert_eq!(thread.message_count(), 1);
    }

    #[test]
    fn test_get_or_create() {
        let store = ChatStore::new();
        let thread = store.create();

        let same = store.get_or_create(Some(thread.id()));
        assert_eq!(same.id(), thread.id());

        let fresh = store.get_or_create(Some("unknown"));
        assert_ne!(fresh.id(), thread.id());
        assert_eq!(store.len(), 2);

        let another = store.get_or_create(None);
        assert_eq!(store.len(), 3);
        assert_eq!(another.message_count(), 0);
    }

    #[test]
    fn test_turns_map_roles() {
        let thread = ChatThread::new("t".to_string());
        thread.add_user_message("q");
        thread.add_assistant_message("a");

        let turns = thread.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, crate::llm::TurnRole::User);
        assert_eq!(turns[1].role, crate::llm::TurnRole::Model);
        assert_eq!(turns[1].text, "a");
    }
}
