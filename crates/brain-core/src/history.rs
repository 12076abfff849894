//! Short-term session memory.
//!
//! This module provides per-user conversational turn buffers with a
//! fixed-size FIFO window and LRU eviction of whole users to prevent
//! memory exhaustion. Nothing here is persisted; a restart starts every
//! conversation from an empty window.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Default number of turns kept per user.
pub const DEFAULT_WINDOW: usize = 10;

/// Default maximum number of users to track before LRU eviction.
const DEFAULT_MAX_USERS: usize = 10000;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Chat-completion role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// A single conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTurn {
    pub role: TurnRole,
    pub content: String,
}

impl SessionTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-user bounded turn buffers with LRU eviction.
///
/// Each user gets a window of at most `window` turns; appending beyond it
/// drops the oldest turn first. The number of tracked users is also capped
/// and the least recently used user is dropped when the cap is exceeded.
///
/// # Example
///
/// ```rust
/// use brain_core::{SessionMemory, SessionTurn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let memory = SessionMemory::new(4);
///
///     memory.append_exchange("1789", "Oi", "Fala! Qual concurso você mira?").await;
///     memory.append("1789", SessionTurn::user("PF")).await;
///
///     let turns = memory.get("1789").await;
///     assert_eq!(turns.len(), 3);
/// }
/// ```
#[derive(Debug)]
pub struct SessionMemory {
    /// Map from user id to turns, in LRU order (least recent first).
    sessions: RwLock<IndexMap<String, VecDeque<SessionTurn>>>,
    /// Maximum number of turns kept per user.
    window: usize,
    /// Maximum number of users tracked before LRU eviction.
    max_users: usize,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SessionMemory {
    /// Create session memory with the given per-user window.
    ///
    /// Uses the default max users limit (10,000).
    pub fn new(window: usize) -> Self {
        Self::with_limits(window, DEFAULT_MAX_USERS)
    }

    /// Create session memory with custom limits.
    ///
    /// # Arguments
    ///
    /// * `window` - Maximum number of turns kept per user
    /// * `max_users` - Maximum number of users to track before LRU eviction
    pub fn with_limits(window: usize, max_users: usize) -> Self {
        Self {
            sessions: RwLock::new(IndexMap::new()),
            window: window.max(1),
            max_users: max_users.max(1),
        }
    }

    /// Per-user window length.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Get the turns for a user, oldest first.
    ///
    /// Creates an empty buffer for unseen users and marks the user as
    /// recently used.
    pub async fn get(&self, user_id: &str) -> Vec<SessionTurn> {
        let mut sessions = self.sessions.write().await;
        let buffer = sessions.shift_remove(user_id).unwrap_or_default();
        let turns = buffer.iter().cloned().collect();
        sessions.insert(user_id.to_string(), buffer);
        self.evict(&mut sessions);
        turns
    }

    /// Append one turn, dropping the oldest turn once the window is full.
    pub async fn append(&self, user_id: &str, turn: SessionTurn) {
        let mut sessions = self.sessions.write().await;
        let mut buffer = sessions.shift_remove(user_id).unwrap_or_default();

        buffer.push_back(turn);
        while buffer.len() > self.window {
            buffer.pop_front();
        }

        sessions.insert(user_id.to_string(), buffer);
        self.evict(&mut sessions);
    }

    /// Append a user input and the agent's reply as two turns.
    pub async fn append_exchange(&self, user_id: &str, input: &str, output: &str) {
        self.append(user_id, SessionTurn::user(input)).await;
        self.append(user_id, SessionTurn::assistant(output)).await;
    }

    /// Empty a user's buffer, keeping the user tracked.
    pub async fn clear(&self, user_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(buffer) = sessions.get_mut(user_id) {
            buffer.clear();
        }
    }

    /// Forget a user entirely.
    pub async fn remove(&self, user_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.shift_remove(user_id).is_some()
    }

    /// Get the current number of tracked users.
    pub async fn user_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    fn evict(&self, sessions: &mut IndexMap<String, VecDeque<SessionTurn>>) {
        while sessions.len() > self.max_users {
            sessions.shift_remove_index(0);
        }
    }
}
