//! Embedding and persisting chunks, and inspecting what has been persisted.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::document::{Chunk, ChunkMetadata, StoredChunk};
use crate::embedding::{EmbeddingProvider, EmbeddingTask};
use crate::error::{ComplianceError, Result};
use crate::filestore::FileVectorStore;
use crate::gemini::GeminiEmbeddingProvider;
use crate::vectorstore::VectorStore;

/// Characters of content shown per sampled entry.
const PREVIEW_CHARS: usize = 200;

/// One stored entry as shown by [`Indexer::inspect`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPreview {
    /// Entry identifier.
    pub id: String,
    /// Chunk provenance.
    pub metadata: ChunkMetadata,
    /// Content, truncated with `...` when longer than the preview length.
    pub content: String,
}

/// Overview of a store's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    /// Total number of entries.
    pub total: usize,
    /// The first entries in insertion order.
    pub samples: Vec<EntryPreview>,
    /// Distinct source file names, sorted.
    pub sources: Vec<String>,
}

/// Embeds chunks and appends them to a [`VectorStore`].
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Indexer {
    /// Create an indexer over the given provider and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Gemini embeddings persisted to the configured store directory.
    pub fn from_config(config: &AppConfig) -> Self {
        let embedder =
            GeminiEmbeddingProvider::new(config.gemini_client(), config.embedding_model.clone());
        let store = FileVectorStore::new(&config.paths.store_dir, config.embedding_model.clone());
        Self::new(Arc::new(embedder), Arc::new(store))
    }

    /// Embed `chunks` and append them to the store. Returns the number written.
    ///
    /// Entries are never deduplicated: indexing the same chunks twice stores
    /// them twice. Clear the store first to rebuild it.
    pub async fn index(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let existing = self.store.count().await?;
        if existing > 0 {
            warn!(existing, "store already holds entries, new entries will be appended");
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings =
            self.embedder.embed_batch(&texts, EmbeddingTask::Document).await.map_err(|e| {
                error!(
                    model = self.embedder.model(),
                    error = %e,
                    "embedding failed during indexing"
                );
                e
            })?;
        if embeddings.len() != chunks.len() {
            return Err(ComplianceError::Embedding {
                provider: self.embedder.model().to_string(),
                message: format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        let entries: Vec<StoredChunk> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredChunk {
                id: Uuid::new_v4().to_string(),
                chunk: chunk.clone(),
                embedding,
            })
            .collect();

        self.store.add(&entries).await?;
        info!(chunk_count = entries.len(), "indexed chunks");
        Ok(entries.len())
    }

    /// Whether the store exists and holds at least one entry.
    pub async fn is_indexed(&self) -> Result<bool> {
        Ok(self.store.count().await? > 0)
    }

    /// Irreversibly delete every entry.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        info!("cleared vector store");
        Ok(())
    }

    /// Summarize the store: total, the first `sample` entries, and all sources.
    pub async fn inspect(&self, sample: usize) -> Result<StoreSummary> {
        let total = self.store.count().await?;
        let all = self.store.entries(total).await?;

        let sources: BTreeSet<&str> = all.iter().map(|e| e.chunk.source()).collect();
        let samples = all
            .iter()
            .take(sample)
            .map(|e| EntryPreview {
                id: e.id.clone(),
                metadata: e.chunk.metadata.clone(),
                content: truncate(&e.chunk.content, PREVIEW_CHARS),
            })
            .collect();

        Ok(StoreSummary {
            total,
            samples,
            sources: sources.into_iter().map(str::to_string).collect(),
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
