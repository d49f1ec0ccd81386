//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ExecutionAdapter` - Language-model calls (the only suspension point
//!   of the dialogue engine)
//! - `ConversationStore` - Persistence of dialogue state, used by hosts

mod conversation_store;
mod execution;

pub use conversation_store::{ConversationStore, StoreError, StoredConversation};
pub use execution::{
    ExecutionAdapter, ExecutionError, ExecutionErrorKind, ExecutionOutcome, ProviderInfo,
};
