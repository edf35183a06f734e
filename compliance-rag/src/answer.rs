//! Grounded answer generation.
//!
//! [`AnswerGenerator::generate`] never fails. Without retrieved context it
//! returns the "not found" response and does not call the model. With context
//! it asks the model for a schema-conforming answer, validates it, and
//! overwrites the confidence with the retrieval score. Any failure along the
//! way degrades to a textual error response.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::document::Chunk;
use crate::error::Result;
use crate::llm::{LanguageModel, StructuredRequest};
use crate::response::ComplianceResponse;
use crate::schema::{ResponseValidator, response_schema};

const SYSTEM_PROMPT: &str = "You are a Lead AI Compliance Engineer. Your task is to answer \
queries based ONLY on the provided context.

Context:
{context}

Guidelines:
1. If the answer is not in the context, clearly state that the information was not found.
2. Be concise and professional.
3. Identify if the regulation indicates compliance (true) or non-compliance (false); use null when the context does not say.
4. Extract the sources using the 'source' and 'section_title' metadata fields from the context.
5. If no context is provided, return a response indicating that the information was not found.
";

/// Render retrieved chunks as one annotated context block.
///
/// Each chunk is introduced by a `--- Document: {source} | Section: {section} ---`
/// line; chunks are separated by a blank line.
pub fn build_context<C: AsRef<Chunk>>(chunks: &[C]) -> String {
    chunks
        .iter()
        .map(|c| {
            let chunk = c.as_ref();
            format!(
                "--- Document: {} | Section: {} ---\n{}",
                chunk.source(),
                chunk.section_title(),
                chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Produces structured, source-attributed answers from retrieved chunks.
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    validator: ResponseValidator,
}

impl AnswerGenerator {
    /// Create a generator backed by `model`.
    pub fn new(model: Arc<dyn LanguageModel>) -> Result<Self> {
        Ok(Self { model, validator: ResponseValidator::new()? })
    }

    /// Build the model request for `query` over `chunks`.
    pub fn request<C: AsRef<Chunk>>(&self, query: &str, chunks: &[C]) -> StructuredRequest {
        StructuredRequest {
            system_instruction: SYSTEM_PROMPT.replace("{context}", &build_context(chunks)),
            prompt: query.to_string(),
            schema: response_schema(),
            temperature: 0.0,
        }
    }

    /// Answer `query` from `chunks`, reporting `max_score` as the confidence.
    pub async fn generate<C>(&self, query: &str, chunks: &[C], max_score: f32) -> ComplianceResponse
    where
        C: AsRef<Chunk> + Sync,
    {
        if chunks.is_empty() {
            info!(max_score, "no grounded context, skipping generation");
            return ComplianceResponse::not_found(max_score);
        }

        let request = self.request(query, chunks);
        debug!(model = self.model.name(), chunk_count = chunks.len(), "requesting answer");

        let parsed = match self.model.generate_structured(&request).await {
            Ok(raw) => self.validator.parse(&raw),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(mut response) => {
                response.confidence = max_score;
                info!(source_count = response.sources.len(), max_score, "generated answer");
                response
            }
            Err(e) => {
                warn!(model = self.model.name(), error = %e, "answer generation failed");
                ComplianceResponse::generation_failed(e, max_score)
            }
        }
    }
}
