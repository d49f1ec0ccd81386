//! Conversation Store Port - Persistence boundary consumed by hosts.
//!
//! The orchestrator never touches storage. Hosts read a conversation, run
//! one orchestrator step on its state, then compare-and-append the result.
//! Writes are rejected when the stored revision moved since the read, and
//! once the conversation is closed.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::dialogue::{DialogueState, TokenUsageReport};
use crate::domain::foundation::ConversationId;

/// Errors that can occur during conversation storage operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Conversation already exists: {0}")]
    AlreadyExists(ConversationId),

    #[error("Conversation {0} is closed")]
    Closed(ConversationId),

    #[error("Conversation {id} moved from revision {expected} to {actual}")]
    RevisionConflict {
        id: ConversationId,
        expected: u64,
        actual: u64,
    },

    #[error("Conversation {0}: new history does not extend the stored history")]
    HistoryRewrite(ConversationId),
}

/// A conversation as last persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConversation {
    pub id: ConversationId,
    pub state: DialogueState,
    /// Incremented on every successful append.
    pub revision: u64,
    pub closed: bool,
    /// Running usage total for the whole conversation.
    pub usage: TokenUsageReport,
}

/// Port for persisting dialogue state between orchestrator calls.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load a conversation.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no conversation exists
    async fn get_conversation(&self, id: ConversationId)
        -> Result<StoredConversation, StoreError>;

    /// Store a fresh conversation at revision 0.
    ///
    /// # Errors
    /// Returns `StoreError::AlreadyExists` if the id is taken
    async fn create(
        &self,
        id: ConversationId,
        state: DialogueState,
    ) -> Result<StoredConversation, StoreError>;

    /// Replace the stored state if it is still at `expected_revision`.
    ///
    /// `usage` is merged into the stored running total. When `ended` is true
    /// (or `new_state` is terminal) the conversation is closed and every
    /// later append is rejected.
    ///
    /// # Errors
    /// - `StoreError::Closed` if the conversation is already closed
    /// - `StoreError::RevisionConflict` if another writer got there first
    /// - `StoreError::HistoryRewrite` if `new_state` drops stored turns
    async fn append_turns(
        &self,
        id: ConversationId,
        expected_revision: u64,
        new_state: DialogueState,
        ended: bool,
        usage: &TokenUsageReport,
    ) -> Result<StoredConversation, StoreError>;
}
