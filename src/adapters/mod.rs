//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Execution adapters (Gemini, mock, deadline wrapper)
//! - `storage` - Conversation store implementations (in-memory)

pub mod ai;
pub mod storage;

pub use ai::{DeadlineExecutionAdapter, GeminiExecutionAdapter, MockExecutionAdapter};
pub use storage::InMemoryConversationStore;
