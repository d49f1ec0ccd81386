//! Sanitization of generated text before it enters the conversation history.

use thiserror::Error;

/// Maximum allowed length of one generated field (bytes).
pub const MAX_GENERATED_LENGTH: usize = 8_000;

/// Errors that can occur during sanitization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Generated text too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("Generated text is empty after sanitization")]
    Empty,
}

/// Cleans model-generated text so it can be shown to the student and fed
/// back to the model on later turns.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer {
    additional_patterns: Vec<String>,
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds patterns to strip on top of the built-in chat-template markers.
    pub fn with_additional_patterns(mut self, patterns: Vec<String>) -> Self {
        self.additional_patterns = patterns;
        self
    }

    /// Sanitizes one generated field.
    ///
    /// # Steps
    /// 1. Validate length
    /// 2. Remove control characters (except newlines/tabs)
    /// 3. Strip chat-template markers
    /// 4. Trim and reject empty output
    pub fn sanitize(&self, text: &str) -> Result<String, SanitizationError> {
        if text.len() > MAX_GENERATED_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_GENERATED_LENGTH,
                actual: text.len(),
            });
        }

        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let stripped = self.strip_injection_markers(&cleaned);
        let trimmed = stripped.trim();
        if trimmed.is_empty() {
            return Err(SanitizationError::Empty);
        }
        Ok(trimmed.to_string())
    }

    fn strip_injection_markers(&self, s: &str) -> String {
        let patterns = [
            "```system",
            "```assistant",
            "[INST]",
            "[/INST]",
            "<|system|>",
            "<|assistant|>",
            "<|user|>",
            "<|im_start|>",
            "<|im_end|>",
            "<<SYS>>",
            "<</SYS>>",
            "<start_of_turn>",
            "<end_of_turn>",
        ];

        let mut result = s.to_string();
        for pattern in patterns {
            result = result.replace(pattern, "");
        }
        for pattern in &self.additional_patterns {
            result = result.replace(pattern.as_str(), "");
        }
        result
    }
}
