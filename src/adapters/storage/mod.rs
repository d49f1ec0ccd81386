//! Storage Adapters
//!
//! Implementations of the ConversationStore port.
//!
//! ## Available Adapters
//!
//! - **InMemoryConversationStore** - Stores conversations in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryConversationStore;
//!
//! let store = InMemoryConversationStore::new();
//! let stored = store.create(ConversationId::new(), state).await?;
//! ```

mod in_memory_conversation_store;

pub use in_memory_conversation_store::InMemoryConversationStore;
