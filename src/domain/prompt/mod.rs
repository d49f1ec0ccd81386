//! Prompt module.
//!
//! Builds the structured request for each stage × role combination and
//! decodes what the model sends back.
//!
//! # Module Organization
//!
//! - `templates` - `PromptKind` and the static instruction text
//! - `schema` - `OutputSchema`, the expected output shape
//! - `builder` - `PromptBuilder`, `Prompt`, `PromptContext`
//! - `decode` - `decode_output` and the typed classifier/generator results
//! - `sanitizer` - cleaning of generated text

mod builder;
mod decode;
mod sanitizer;
mod schema;
mod templates;

pub use builder::{Prompt, PromptBuilder, PromptContext, SYNTHETIC_USER_TURN};
pub use decode::{
    decode_output, ClassifierOutput, ExtractedData, GeneratorOutput, ParsedOutput,
    SchemaValidationError,
};
pub use sanitizer::{ResponseSanitizer, SanitizationError, MAX_GENERATED_LENGTH};
pub use schema::OutputSchema;
pub use templates::PromptKind;
