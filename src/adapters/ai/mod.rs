//! Execution Adapters.
//!
//! Implementations of the ExecutionAdapter port.
//!
//! ## Available Adapters
//!
//! - `GeminiExecutionAdapter` - Gemini `generateContent` over HTTP
//! - `MockExecutionAdapter` - Scripted responses for testing
//! - `DeadlineExecutionAdapter` - Per-call deadline around any adapter

mod deadline_adapter;
mod gemini_adapter;
mod mock_adapter;

pub use deadline_adapter::DeadlineExecutionAdapter;
pub use gemini_adapter::{
    GeminiConfig, GeminiExecutionAdapter, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};
pub use mock_adapter::{MockExecutionAdapter, MockResponse, MOCK_USAGE};
