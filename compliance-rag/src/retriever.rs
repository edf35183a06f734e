//! Query-time retrieval with a grounding threshold.
//!
//! The retriever embeds a query, fetches the top candidates from the store
//! and keeps those whose score reaches the threshold. It also reports the
//! best score among *all* candidates, so a caller can tell "nothing relevant"
//! apart from "something close, but not close enough".

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::{DEFAULT_GROUNDING_THRESHOLD, DEFAULT_TOP_K};
use crate::document::SearchResult;
use crate::embedding::{EmbeddingProvider, EmbeddingTask};
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// Chunks that cleared the threshold plus the best candidate score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    /// Candidates with `score >= threshold`, best first.
    pub chunks: Vec<SearchResult>,
    /// Highest score among all candidates before filtering, `0.0` if none.
    pub max_score: f32,
}

impl Retrieval {
    /// Whether no candidate cleared the threshold.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Split `candidates` at `threshold` (inclusive), keeping the best score.
pub fn apply_threshold(candidates: Vec<SearchResult>, threshold: f32) -> Retrieval {
    let max_score = candidates.iter().map(|c| c.score).fold(0.0_f32, f32::max);
    let chunks = candidates.into_iter().filter(|c| c.score >= threshold).collect();
    Retrieval { chunks, max_score }
}

/// Embeds queries and searches a [`VectorStore`].
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    threshold: f32,
}

impl Retriever {
    /// Create a retriever with the default top-k and threshold.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store, top_k: DEFAULT_TOP_K, threshold: DEFAULT_GROUNDING_THRESHOLD }
    }

    /// Set the number of candidates fetched per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the default grounding threshold.
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Retrieve grounding chunks for `query`.
    ///
    /// `threshold` overrides the default for this call. An empty store yields
    /// an empty retrieval with `max_score == 0.0`.
    ///
    /// # Errors
    ///
    /// Propagates embedding and store failures, including
    /// [`ComplianceError::EmbeddingMismatch`](crate::ComplianceError::EmbeddingMismatch).
    pub async fn retrieve(&self, query: &str, threshold: Option<f32>) -> Result<Retrieval> {
        let threshold = threshold.unwrap_or(self.threshold);

        let embedding = self.embedder.embed(query, EmbeddingTask::Query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let candidates = self.store.search(&embedding, self.top_k).await.map_err(|e| {
            error!(error = %e, "vector store search failed");
            e
        })?;
        debug!(candidate_count = candidates.len(), threshold, "searched store");

        let retrieval = apply_threshold(candidates, threshold);
        info!(
            retrieved = retrieval.chunks.len(),
            max_score = retrieval.max_score,
            threshold,
            "retrieval completed"
        );
        Ok(retrieval)
    }
}
