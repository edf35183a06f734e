//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// What an embedding will be used for.
///
/// Retrieval-tuned models embed stored documents and incoming queries
/// slightly differently; both sides must still come from the same model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    /// Text that is being indexed.
    Document,
    /// A query that will be compared against indexed documents.
    Query,
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific backend behind a unified async interface.
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends that
/// support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use compliance_rag::{EmbeddingProvider, EmbeddingTask};
///
/// let embedding = provider.embed("How much lead is in TC-3541-A?", EmbeddingTask::Query).await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the embedding model. Index and query must agree on it.
    fn model(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in order.
    async fn embed_batch(&self, texts: &[&str], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text, task).await?);
        }
        Ok(results)
    }
}
