//! Vector store trait for persisting and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{SearchResult, StoredChunk};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// Scores returned by [`search`](VectorStore::search) are relevance values in
/// `[0, 1]` where higher means more similar, not raw distances.
///
/// # Example
///
/// ```rust,ignore
/// use compliance_rag::{FileVectorStore, VectorStore};
///
/// let store = FileVectorStore::new("vector_store", "models/embedding-001");
/// store.add(&entries).await?;
/// let results = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append entries. Existing entries are kept; nothing is deduplicated.
    async fn add(&self, entries: &[StoredChunk]) -> Result<()>;

    /// Return up to `top_k` entries most similar to `embedding`, ordered by
    /// descending score. Empty when the store does not exist.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Number of stored entries. Zero when the store does not exist.
    async fn count(&self) -> Result<usize>;

    /// Up to `limit` stored entries in insertion order.
    async fn entries(&self, limit: usize) -> Result<Vec<StoredChunk>>;

    /// Delete every entry. A no-op when the store does not exist.
    async fn clear(&self) -> Result<()>;
}

/// Cosine similarity of two vectors mapped to a `[0, 1]` relevance score.
///
/// Returns 0.0 if either vector has zero magnitude; negative similarity is
/// clamped to 0.0.
pub fn relevance_score(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Score every entry against `embedding` and keep the best `top_k`.
pub(crate) fn rank<'a>(
    entries: impl IntoIterator<Item = &'a StoredChunk>,
    embedding: &[f32],
    top_k: usize,
) -> Vec<SearchResult> {
    let mut scored: Vec<SearchResult> = entries
        .into_iter()
        .map(|entry| SearchResult {
            chunk: entry.chunk.clone(),
            score: relevance_score(&entry.embedding, embedding),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    scored
}
