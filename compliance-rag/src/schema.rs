//! Parse-or-reject validation of model output.
//!
//! The model is asked for JSON matching [`response_schema`], but nothing
//! guarantees it complies. [`ResponseValidator`] checks the raw text against
//! the schema with `jsonschema`, then deserializes it into a
//! [`ComplianceResponse`]. Any mismatch is a [`ComplianceError::InvalidResponse`].

use jsonschema::Validator;
use serde_json::{Value, json};

use crate::error::{ComplianceError, Result};
use crate::response::ComplianceResponse;

/// JSON Schema of the structured answer requested from the model.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "answer": {
                "type": "string",
                "description": "Concise natural language response answering the user query."
            },
            "is_compliant": {
                "type": ["boolean", "null"],
                "description": "Explicit compliance status if mentioned in the text. True for compliant, false for non-compliant, null if unknown."
            },
            "confidence": {
                "type": "number",
                "description": "Confidence that the answer is supported by the context, between 0 and 1."
            },
            "sources": {
                "type": "array",
                "description": "Sources used, taken from the 'source' and 'section_title' metadata of the context.",
                "items": {
                    "type": "object",
                    "properties": {
                        "file": { "type": "string" },
                        "section": { "type": "string" }
                    },
                    "required": ["file", "section"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["answer", "confidence", "sources"],
        "additionalProperties": false
    })
}

/// Validates raw model output against [`response_schema`].
pub struct ResponseValidator {
    validator: Validator,
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator").finish_non_exhaustive()
    }
}

impl ResponseValidator {
    /// Compile the response schema.
    pub fn new() -> Result<Self> {
        let validator = Validator::new(&response_schema())
            .map_err(|e| ComplianceError::InvalidResponse(format!("invalid schema: {e}")))?;
        Ok(Self { validator })
    }

    /// Parse `raw` model output into a response, or reject it.
    ///
    /// Accepts bare JSON or JSON wrapped in a markdown code fence.
    pub fn parse(&self, raw: &str) -> Result<ComplianceResponse> {
        let json = extract_json(raw).ok_or_else(|| {
            ComplianceError::InvalidResponse("model output is not valid JSON".to_string())
        })?;

        if let Err(error) = self.validator.validate(&json) {
            return Err(ComplianceError::InvalidResponse(format!(
                "schema validation failed: {error}"
            )));
        }

        serde_json::from_value(json).map_err(|e| {
            ComplianceError::InvalidResponse(format!("failed to decode response: {e}"))
        })
    }
}

fn extract_json(text: &str) -> Option<Value> {
    if let Ok(json) = serde_json::from_str(text.trim()) {
        return Some(json);
    }
    extract_json_from_markdown(text).and_then(|inner| serde_json::from_str(&inner).ok())
}

/// Body of the first code fence tagged `json` (any case) or left untagged.
fn extract_json_from_markdown(text: &str) -> Option<String> {
    const FENCE: &str = "```";

    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let (info, body) = after_open.split_once('\n')?;
        let close = body.find(FENCE)?;

        let info = info.trim();
        if info.is_empty() || info.eq_ignore_ascii_case("json") {
            return Some(body[..close].trim().to_string());
        }
        rest = &body[close + FENCE.len()..];
    }
    None
}
