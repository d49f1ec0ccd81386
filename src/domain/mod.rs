//! Domain layer containing the dialogue engine's types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machine trait)
//! - `dialogue` - Stages, dialogue state, versioning and token accounting
//! - `prompt` - Prompt construction and decoding of model output
//! - `handlers` - One handler per active stage and the handler registry

pub mod dialogue;
pub mod foundation;
pub mod handlers;
pub mod prompt;
