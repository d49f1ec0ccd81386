//! In-Memory Conversation Store Adapter
//!
//! Stores conversations in memory with optimistic concurrency.
//! Useful for testing, development and single-process hosts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::dialogue::{DialogueState, TokenUsageReport};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError, StoredConversation};

/// In-memory storage for conversations.
///
/// The compare-and-append runs under a single write lock, so two writers
/// holding the same revision cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, StoredConversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<StoredConversation, StoreError> {
        self.conversations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(
        &self,
        id: ConversationId,
        state: DialogueState,
    ) -> Result<StoredConversation, StoreError> {
        let mut conversations = self.conversations.write().await;
        if conversations.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        let stored = StoredConversation {
            id,
            closed: state.is_terminal(),
            state,
            revision: 0,
            usage: TokenUsageReport::empty(),
        };
        conversations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn append_turns(
        &self,
        id: ConversationId,
        expected_revision: u64,
        new_state: DialogueState,
        ended: bool,
        usage: &TokenUsageReport,
    ) -> Result<StoredConversation, StoreError> {
        let mut conversations = self.conversations.write().await;
        let stored = conversations.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if stored.closed {
            return Err(StoreError::Closed(id));
        }
        if stored.revision != expected_revision {
            return Err(StoreError::RevisionConflict {
                id,
                expected: expected_revision,
                actual: stored.revision,
            });
        }
        if !new_state.extends_history_of(&stored.state) {
            return Err(StoreError::HistoryRewrite(id));
        }

        stored.closed = ended || new_state.is_terminal();
        stored.state = new_state;
        stored.revision += 1;
        stored.usage = stored.usage.merge(usage);
        Ok(stored.clone())
    }
}
