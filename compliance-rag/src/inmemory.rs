//! In-memory vector store.
//!
//! [`InMemoryVectorStore`] keeps entries in a `Vec` behind a
//! `tokio::sync::RwLock`. Nothing is persisted. It is used by tests and for
//! one-shot runs where a corpus is indexed and queried in the same process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{SearchResult, StoredChunk};
use crate::error::Result;
use crate::vectorstore::{VectorStore, rank};

/// A vector store held entirely in memory, searched by cosine similarity.
///
/// # Example
///
/// ```rust,ignore
/// use compliance_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.add(&entries).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, entries: &[StoredChunk]) -> Result<()> {
        self.entries.write().await.extend_from_slice(entries);
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        Ok(rank(entries.iter(), embedding, top_k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn entries(&self, limit: usize) -> Result<Vec<StoredChunk>> {
        Ok(self.entries.read().await.iter().take(limit).cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
