//! Application layer - Session operations and host-side persistence flow.
//!
//! - `orchestrator` - `DialogueOrchestrator`, the four session operations
//! - `conversation_service` - load → orchestrate → compare-and-append

mod conversation_service;
mod orchestrator;

pub use conversation_service::{ConversationService, ServiceError, ServiceReply};
pub use orchestrator::DialogueOrchestrator;
