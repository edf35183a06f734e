//! The structured, source-attributed answer returned for every query.

use serde::{Deserialize, Serialize};

/// Answer text used when no retrieved chunk clears the grounding threshold.
pub const NOT_FOUND_ANSWER: &str = "Information not found. The query did not meet the required \
                                    grounding threshold or no relevant documents were found.";

/// Prefix of the answer text used when generation fails.
pub const GENERATION_ERROR_PREFIX: &str = "An error occurred during response generation";

/// A document section cited by an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Source {
    /// Source file name.
    pub file: String,
    /// Section title within the file.
    pub section: String,
}

/// Structured response for a single query.
///
/// `confidence` always carries the retrieval score of the best candidate,
/// never a value reported by the language model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComplianceResponse {
    /// Natural-language answer.
    pub answer: String,
    /// Compliance status when the documents state it.
    #[serde(default)]
    pub is_compliant: Option<bool>,
    /// Grounding confidence in `[0, 1]`.
    pub confidence: f32,
    /// Sections the answer is based on.
    pub sources: Vec<Source>,
}

impl ComplianceResponse {
    /// The ungrounded response: nothing relevant enough was retrieved.
    pub fn not_found(max_score: f32) -> Self {
        Self {
            answer: NOT_FOUND_ANSWER.to_string(),
            is_compliant: None,
            confidence: max_score,
            sources: Vec::new(),
        }
    }

    /// The safe fallback response for a failed generation.
    pub fn generation_failed(reason: impl std::fmt::Display, max_score: f32) -> Self {
        Self {
            answer: format!("{GENERATION_ERROR_PREFIX}: {reason}"),
            is_compliant: None,
            confidence: max_score,
            sources: Vec::new(),
        }
    }

    /// Whether this response carries no grounded content.
    pub fn is_ungrounded(&self) -> bool {
        self.sources.is_empty() && self.is_compliant.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_no_sources_or_status() {
        let response = ComplianceResponse::not_found(0.42);
        assert!(response.answer.starts_with("Information not found"));
        assert_eq!(response.confidence, 0.42);
        assert!(response.is_ungrounded());
    }

    #[test]
    fn generation_failure_embeds_reason() {
        let response = ComplianceResponse::generation_failed("quota exceeded", 0.8);
        assert_eq!(response.answer, "An error occurred during response generation: quota exceeded");
        assert_eq!(response.confidence, 0.8);
        assert!(response.is_ungrounded());
    }
}
