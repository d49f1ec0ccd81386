//! Expected output shapes for model calls.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::dialogue::{DialogueStage, Trigger};

static GENERATOR_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "rationale": { "type": "STRING" },
            "response_message": { "type": "STRING" },
            "concise_question": { "type": "STRING" }
        },
        "required": ["rationale", "response_message", "concise_question"],
        "propertyOrdering": ["rationale", "response_message", "concise_question"]
    })
});

/// Describes what a model call must return.
///
/// The decode step enforces the same constraints the JSON schema advertises,
/// so a provider that ignores the schema still cannot smuggle an
/// out-of-stage intent into the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputSchema {
    /// Structured classification restricted to `intents`.
    Classifier {
        stage: DialogueStage,
        intents: Vec<Trigger>,
    },
    /// Structured tutor reply with exactly one question.
    Generator,
    /// Free text (closing summary).
    Text,
}

impl OutputSchema {
    /// Classifier schema whose intent enum is the stage's trigger set.
    pub fn classifier(stage: DialogueStage) -> Self {
        Self::Classifier {
            stage,
            intents: Trigger::valid_for(stage).to_vec(),
        }
    }

    /// Returns true if the model must answer with JSON.
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::Text)
    }

    /// JSON schema in the OpenAPI subset accepted as a `responseSchema`.
    ///
    /// Returns `None` for free text.
    pub fn to_json_schema(&self) -> Option<Value> {
        match self {
            Self::Classifier { intents, .. } => {
                let allowed: Vec<&str> = intents.iter().map(|t| t.as_str()).collect();
                Some(json!({
                    "type": "OBJECT",
                    "properties": {
                        "rationale": { "type": "STRING" },
                        "detected_intent": { "type": "STRING", "enum": allowed },
                        "confidence_score": {
                            "type": "NUMBER",
                            "minimum": 0.0,
                            "maximum": 1.0
                        },
                        "extracted_data": {
                            "type": "OBJECT",
                            "nullable": true,
                            "properties": {
                                "stance": { "type": "STRING", "nullable": true },
                                "reasoning": { "type": "STRING", "nullable": true },
                                "principle": { "type": "STRING", "nullable": true },
                                "classification": { "type": "STRING", "nullable": true }
                            }
                        }
                    },
                    "required": ["rationale", "detected_intent", "confidence_score"],
                    "propertyOrdering": [
                        "rationale",
                        "detected_intent",
                        "confidence_score",
                        "extracted_data"
                    ]
                }))
            }
            Self::Generator => Some(GENERATOR_SCHEMA.clone()),
            Self::Text => None,
        }
    }
}
