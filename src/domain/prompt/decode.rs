//! Decode step: raw model output to typed results.
//!
//! Every constraint the schema advertises is checked here. Providers are
//! not trusted to honour `responseSchema`.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::dialogue::{DialogueStage, Trigger};

use super::sanitizer::{ResponseSanitizer, SanitizationError};
use super::schema::OutputSchema;

/// Errors that can occur while decoding model output.
///
/// These contain detailed information for logs. Use `to_client_message()`
/// for anything that might reach a student.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaValidationError {
    #[error("Output is not valid JSON: {message}")]
    Malformed { message: String },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid type for field {field}: expected {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Value out of range for field {field}: {value} not in [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Value {value} for field {field} is not allowed in stage {stage}")]
    NotAllowed {
        field: String,
        value: String,
        stage: DialogueStage,
    },

    #[error("Field {field} must contain exactly one question, found {count}")]
    QuestionCount { field: String, count: usize },

    #[error("Sanitization failed for field {field}: {source}")]
    Sanitization {
        field: String,
        #[source]
        source: SanitizationError,
    },
}

impl SchemaValidationError {
    /// Client-safe description that never echoes model output.
    pub fn to_client_message(&self) -> String {
        match self {
            Self::Malformed { .. } => "The tutor's reply could not be read".to_string(),
            Self::MissingRequired { field }
            | Self::InvalidType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotAllowed { field, .. }
            | Self::QuestionCount { field, .. }
            | Self::Sanitization { field, .. } => {
                format!("The tutor's reply had an invalid '{}' field", field)
            }
        }
    }
}

/// Fields the classifier may pull out of the student's message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedData {
    pub stance: Option<String>,
    pub reasoning: Option<String>,
    pub principle: Option<String>,
    pub classification: Option<String>,
}

/// A validated classifier decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierOutput {
    pub rationale: String,
    pub detected_intent: Trigger,
    pub confidence_score: f64,
    pub extracted_data: Option<ExtractedData>,
}

impl ClassifierOutput {
    /// Extracted stance text, if the classifier found one.
    pub fn stance(&self) -> Option<&str> {
        self.extracted_data.as_ref()?.stance.as_deref()
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.extracted_data.as_ref()?.reasoning.as_deref()
    }

    pub fn principle(&self) -> Option<&str> {
        self.extracted_data.as_ref()?.principle.as_deref()
    }

    pub fn classification(&self) -> Option<&str> {
        self.extracted_data.as_ref()?.classification.as_deref()
    }
}

/// A validated, sanitized tutor reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorOutput {
    pub rationale: String,
    pub response_message: String,
    pub concise_question: String,
}

impl GeneratorOutput {
    /// Text shown to the student and appended to the history.
    pub fn message(&self) -> String {
        format!("{}\n\n{}", self.response_message, self.concise_question)
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParsedOutput {
    Classification(ClassifierOutput),
    Generation(GeneratorOutput),
    Text(String),
}

/// Decodes `raw` model output according to `schema`.
pub fn decode_output(
    schema: &OutputSchema,
    raw: &str,
) -> Result<ParsedOutput, SchemaValidationError> {
    let sanitizer = ResponseSanitizer::new();
    match schema {
        OutputSchema::Text => sanitizer
            .sanitize(raw)
            .map(ParsedOutput::Text)
            .map_err(|source| SchemaValidationError::Sanitization {
                field: "text".to_string(),
                source,
            }),
        OutputSchema::Classifier { stage, intents } => {
            let object = parse_object(raw)?;
            decode_classifier(&object, *stage, intents).map(ParsedOutput::Classification)
        }
        OutputSchema::Generator => {
            let object = parse_object(raw)?;
            decode_generator(&object, &sanitizer).map(ParsedOutput::Generation)
        }
    }
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, SchemaValidationError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        SchemaValidationError::Malformed {
            message: e.to_string(),
        }
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SchemaValidationError::InvalidType {
            field: "$".to_string(),
            expected: "object".to_string(),
            actual: type_name(&other).to_string(),
        }),
    }
}

/// Models sometimes wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn decode_classifier(
    object: &Map<String, Value>,
    stage: DialogueStage,
    intents: &[Trigger],
) -> Result<ClassifierOutput, SchemaValidationError> {
    let rationale = required_str(object, "rationale")?.to_string();

    let intent_raw = required_str(object, "detected_intent")?;
    let detected_intent = intent_raw
        .parse::<Trigger>()
        .ok()
        .filter(|t| intents.contains(t))
        .ok_or_else(|| SchemaValidationError::NotAllowed {
            field: "detected_intent".to_string(),
            value: intent_raw.to_string(),
            stage,
        })?;

    let confidence_score = match object.get("confidence_score") {
        None | Some(Value::Null) => return Err(missing("confidence_score")),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(other) => return Err(invalid_type("confidence_score", "number", other)),
    };
    if !(0.0..=1.0).contains(&confidence_score) {
        return Err(SchemaValidationError::OutOfRange {
            field: "confidence_score".to_string(),
            value: confidence_score.to_string(),
            min: "0".to_string(),
            max: "1".to_string(),
        });
    }

    let extracted_data = match object.get("extracted_data") {
        None | Some(Value::Null) => None,
        Some(Value::Object(data)) => Some(ExtractedData {
            stance: optional_str(data, "stance")?,
            reasoning: optional_str(data, "reasoning")?,
            principle: optional_str(data, "principle")?,
            classification: optional_str(data, "classification")?,
        }),
        Some(other) => return Err(invalid_type("extracted_data", "object", other)),
    };

    Ok(ClassifierOutput {
        rationale,
        detected_intent,
        confidence_score,
        extracted_data,
    })
}

fn decode_generator(
    object: &Map<String, Value>,
    sanitizer: &ResponseSanitizer,
) -> Result<GeneratorOutput, SchemaValidationError> {
    let rationale = required_str(object, "rationale")?.to_string();
    let response_message = sanitize_field(
        sanitizer,
        "response_message",
        required_str(object, "response_message")?,
    )?;
    let concise_question = sanitize_field(
        sanitizer,
        "concise_question",
        required_str(object, "concise_question")?,
    )?;

    let count = concise_question.chars().filter(|c| matches!(c, '?' | '？')).count();
    if count != 1 || !concise_question.ends_with(['?', '？']) {
        return Err(SchemaValidationError::QuestionCount {
            field: "concise_question".to_string(),
            count,
        });
    }

    Ok(GeneratorOutput {
        rationale,
        response_message,
        concise_question,
    })
}

fn sanitize_field(
    sanitizer: &ResponseSanitizer,
    field: &str,
    text: &str,
) -> Result<String, SchemaValidationError> {
    sanitizer
        .sanitize(text)
        .map_err(|source| SchemaValidationError::Sanitization {
            field: field.to_string(),
            source,
        })
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, SchemaValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(missing(field)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(invalid_type(field, "string", other)),
    }
}

/// Blank strings count as absent.
fn optional_str(
    object: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, SchemaValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(invalid_type(field, "string", other)),
    }
}

fn missing(field: &str) -> SchemaValidationError {
    SchemaValidationError::MissingRequired {
        field: field.to_string(),
    }
}

fn invalid_type(field: &str, expected: &str, actual: &Value) -> SchemaValidationError {
    SchemaValidationError::InvalidType {
        field: field.to_string(),
        expected: expected.to_string(),
        actual: type_name(actual).to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classifier(stage: DialogueStage) -> OutputSchema {
        OutputSchema::classifier(stage)
    }

    #[test]
    fn decodes_classifier_with_extracted_stance() {
        let raw = json!({
            "rationale": "gave position and reason",
            "detected_intent": "TR_V1_ESTABLISHED",
            "confidence_score": 0.92,
            "extracted_data": { "stance": "acceptable", "reasoning": "because Y", "principle": null }
        })
        .to_string();

        let ParsedOutput::Classification(out) =
            decode_output(&classifier(DialogueStage::AskingStance), &raw).unwrap()
        else {
            panic!("expected classification");
        };
        assert_eq!(out.detected_intent, Trigger::V1Established);
        assert_eq!(out.stance(), Some("acceptable"));
        assert_eq!(out.reasoning(), Some("because Y"));
        assert_eq!(out.principle(), None);
    }

    #[test]
    fn rejects_intent_outside_stage_set() {
        let raw = json!({
            "rationale": "r",
            "detected_intent": "TR_CONFIRM_END",
            "confidence_score": 0.5
        })
        .to_string();

        let err = decode_output(&classifier(DialogueStage::CaseChallenge), &raw).unwrap_err();
        assert!(matches!(err, SchemaValidationError::NotAllowed { ref value, .. } if value == "TR_CONFIRM_END"));
    }

    #[test]
    fn rejects_unknown_intent() {
        let raw = json!({ "rationale": "r", "detected_intent": "TR_DANCE", "confidence_score": 0.5 }).to_string();
        let err = decode_output(&classifier(DialogueStage::Closure), &raw).unwrap_err();
        assert!(matches!(err, SchemaValidationError::NotAllowed { .. }));
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let raw = json!({ "rationale": "r", "detected_intent": "TR_CLARIFY", "confidence_score": 1.5 }).to_string();
        let err = decode_output(&classifier(DialogueStage::Closure), &raw).unwrap_err();
        assert!(matches!(err, SchemaValidationError::OutOfRange { .. }));
    }

    #[test]
    fn rejects_missing_confidence() {
        let raw = json!({ "rationale": "r", "detected_intent": "TR_CLARIFY" }).to_string();
        let err = decode_output(&classifier(DialogueStage::Closure), &raw).unwrap_err();
        assert_eq!(
            err,
            SchemaValidationError::MissingRequired {
                field: "confidence_score".to_string()
            }
        );
    }

    #[test]
    fn blank_extracted_fields_are_absent() {
        let raw = json!({
            "rationale": "r",
            "detected_intent": "TR_CASE_COMPLETED",
            "confidence_score": 0.7,
            "extracted_data": { "stance": "  " }
        })
        .to_string();
        let ParsedOutput::Classification(out) =
            decode_output(&classifier(DialogueStage::CaseChallenge), &raw).unwrap()
        else {
            panic!("expected classification");
        };
        assert_eq!(out.stance(), None);
    }

    #[test]
    fn decodes_generator_in_code_fence() {
        let raw = format!(
            "```json\n{}\n```",
            json!({
                "rationale": "open",
                "response_message": "Let's begin.",
                "concise_question": "Is lying ever acceptable?"
            })
        );
        let ParsedOutput::Generation(out) = decode_output(&OutputSchema::Generator, &raw).unwrap() else {
            panic!("expected generation");
        };
        assert_eq!(out.message(), "Let's begin.\n\nIs lying ever acceptable?");
    }

    #[test]
    fn rejects_two_questions() {
        let raw = json!({
            "rationale": "r",
            "response_message": "Hm.",
            "concise_question": "Why? And when?"
        })
        .to_string();
        let err = decode_output(&OutputSchema::Generator, &raw).unwrap_err();
        assert_eq!(
            err,
            SchemaValidationError::QuestionCount {
                field: "concise_question".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn rejects_statement_as_question() {
        let raw = json!({
            "rationale": "r",
            "response_message": "Hm.",
            "concise_question": "Tell me more."
        })
        .to_string();
        assert!(matches!(
            decode_output(&OutputSchema::Generator, &raw),
            Err(SchemaValidationError::QuestionCount { count: 0, .. })
        ));
    }

    #[test]
    fn rejects_non_json_for_structured_schema() {
        let err = decode_output(&OutputSchema::Generator, "Sure! Here you go").unwrap_err();
        assert!(matches!(err, SchemaValidationError::Malformed { .. }));
        assert_eq!(err.to_client_message(), "The tutor's reply could not be read");
    }

    #[test]
    fn text_is_sanitized() {
        let out = decode_output(&OutputSchema::Text, "  You moved from A to B.<|im_end|> ").unwrap();
        assert_eq!(out, ParsedOutput::Text("You moved from A to B.".to_string()));
    }
}
