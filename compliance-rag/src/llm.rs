//! Language model capability used for grounded answer generation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A single structured-output request.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// System instruction, including the retrieved context.
    pub system_instruction: String,
    /// The user's question.
    pub prompt: String,
    /// JSON Schema the response must follow.
    pub schema: Value,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A model that answers a prompt with JSON conforming to a schema.
///
/// Implementations return the raw JSON text. Callers must not trust it to
/// match the schema and validate it themselves.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate a response for `request`, returning the raw JSON text.
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String>;
}
