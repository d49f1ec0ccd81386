//! ConversationService - Host-side load → orchestrate → compare-and-append.
//!
//! Reads a stored conversation once, runs one orchestrator step on its
//! state, then appends the result at the revision it read. A concurrent
//! writer makes the append fail with `StoreError::RevisionConflict`; the
//! caller may reload and retry.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::domain::dialogue::{DialogueError, StageResult, TokenUsageReport};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError, StoredConversation};

use super::DialogueOrchestrator;

/// Errors from a service call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Dialogue(#[from] DialogueError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Text safe to show the student.
    pub fn to_client_message(&self) -> &'static str {
        match self {
            Self::Dialogue(DialogueError::Execution { source, .. }) => source.to_client_message(),
            Self::Store(StoreError::Closed(_)) => "This discussion has already finished.",
            Self::Store(StoreError::RevisionConflict { .. }) => {
                "Your previous message is still being processed. Please try again."
            }
            _ => "Something went wrong. Please try again later.",
        }
    }
}

/// One persisted step: what the student sees plus the stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    pub message: String,
    pub ended: bool,
    pub conversation: StoredConversation,
}

/// Composes an orchestrator with a conversation store.
#[derive(Clone)]
pub struct ConversationService {
    orchestrator: DialogueOrchestrator,
    store: Arc<dyn ConversationStore>,
}

impl ConversationService {
    pub fn new(orchestrator: DialogueOrchestrator, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    /// Creates and stores a fresh conversation.
    pub async fn open(&self, topic: &str) -> Result<StoredConversation, ServiceError> {
        let state = self.orchestrator.initialize_session(topic);
        Ok(self.store.create(ConversationId::new(), state).await?)
    }

    /// Issues the opening question.
    pub async fn start(
        &self,
        id: ConversationId,
        topic_context: Option<&str>,
    ) -> Result<ServiceReply, ServiceError> {
        let stored = self.load_open(id).await?;
        let step = self
            .orchestrator
            .start_conversation(&stored.state, topic_context)
            .await;
        self.persist(stored, step).await
    }

    /// Processes one student message.
    pub async fn reply(
        &self,
        id: ConversationId,
        text: &str,
        topic_context: Option<&str>,
    ) -> Result<ServiceReply, ServiceError> {
        let stored = self.load_open(id).await?;
        let step = self
            .orchestrator
            .process_student_input(&stored.state, text, topic_context)
            .await;
        self.persist(stored, step).await
    }

    /// Aborts and closes the conversation.
    pub async fn abort(&self, id: ConversationId) -> Result<StoredConversation, ServiceError> {
        let stored = self.load_open(id).await?;
        let aborted = self.orchestrator.abort(&stored.state);
        Ok(self
            .store
            .append_turns(id, stored.revision, aborted, false, &TokenUsageReport::empty())
            .await?)
    }

    async fn load_open(&self, id: ConversationId) -> Result<StoredConversation, ServiceError> {
        let stored = self.store.get_conversation(id).await?;
        if stored.closed {
            return Err(StoreError::Closed(id).into());
        }
        Ok(stored)
    }

    /// Appends a successful step. A failed step leaves the stored state
    /// alone but still folds its billed usage into the running total.
    async fn persist(
        &self,
        stored: StoredConversation,
        step: Result<StageResult, DialogueError>,
    ) -> Result<ServiceReply, ServiceError> {
        let result = match step {
            Ok(result) => result,
            Err(err) => {
                if let Some(usage) = err.usage().filter(|u| !u.is_empty()) {
                    // Same state, so the history check passes trivially.
                    if let Err(store_err) = self
                        .store
                        .append_turns(stored.id, stored.revision, stored.state.clone(), false, usage)
                        .await
                    {
                        warn!(
                            conversation_id = %stored.id,
                            error = %store_err,
                            "Could not record usage of a failed step"
                        );
                    }
                }
                return Err(err.into());
            }
        };

        let conversation = self
            .store
            .append_turns(
                stored.id,
                stored.revision,
                result.new_state,
                result.ended,
                &result.usage,
            )
            .await?;

        Ok(ServiceReply {
            message: result.message,
            ended: result.ended,
            conversation,
        })
    }
}
