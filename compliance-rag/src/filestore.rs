//! Directory-backed persistent vector store.
//!
//! Layout of a store directory:
//!
//! ```text
//! vector_store/
//!   manifest.json   { "version": 1, "embedding_model": "...", "dimensions": 768 }
//!   entries.jsonl   one StoredChunk per line
//! ```
//!
//! The manifest is written on the first [`add`](VectorStore::add) and pins the
//! embedding model and dimension. Opening the store with a different model
//! fails with [`ComplianceError::EmbeddingMismatch`]: scores between vectors
//! of different models are meaningless. Search is a flat scan over every entry;
//! searching a store that was never written returns no results.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::document::{SearchResult, StoredChunk};
use crate::error::{ComplianceError, Result};
use crate::vectorstore::{VectorStore, rank};

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.jsonl";
const MANIFEST_VERSION: u32 = 1;
const BACKEND: &str = "FileStore";

/// Metadata recorded alongside the entries of a store directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreManifest {
    /// Layout version.
    pub version: u32,
    /// Embedding model every stored vector was produced with.
    pub embedding_model: String,
    /// Length of every stored vector.
    pub dimensions: usize,
}

/// A vector store persisted as a manifest plus a JSON-lines file.
///
/// Single-process use only. Writes are serialized within the process but
/// nothing guards against a second process writing the same directory.
#[derive(Debug)]
pub struct FileVectorStore {
    dir: PathBuf,
    embedding_model: String,
    write_lock: Mutex<()>,
}

impl FileVectorStore {
    /// Open (lazily) the store at `dir` for vectors produced by `embedding_model`.
    ///
    /// Nothing is read or created until the first operation.
    pub fn new(dir: impl Into<PathBuf>, embedding_model: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            embedding_model: embedding_model.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the manifest, or `None` if the store has never been written.
    pub async fn manifest(&self) -> Result<Option<StoreManifest>> {
        let path = self.dir.join(MANIFEST_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(&path).await?;
        let manifest = serde_json::from_str(&data).map_err(|e| ComplianceError::VectorStore {
            backend: BACKEND.to_string(),
            message: format!("corrupt manifest '{}': {e}", path.display()),
        })?;
        Ok(Some(manifest))
    }

    /// Read the manifest and check it matches the configured model.
    async fn checked_manifest(&self) -> Result<Option<StoreManifest>> {
        let manifest = self.manifest().await?;
        if let Some(m) = &manifest {
            if m.embedding_model != self.embedding_model {
                return Err(ComplianceError::EmbeddingMismatch {
                    stored: m.embedding_model.clone(),
                    configured: self.embedding_model.clone(),
                });
            }
        }
        Ok(manifest)
    }

    async fn write_manifest(&self, manifest: &StoreManifest) -> Result<()> {
        let data = serde_json::to_string_pretty(manifest)?;
        tokio::fs::write(self.dir.join(MANIFEST_FILE), data).await?;
        Ok(())
    }

    async fn load_entries(&self) -> Result<Vec<StoredChunk>> {
        let path = self.dir.join(ENTRIES_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        data.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| ComplianceError::VectorStore {
                    backend: BACKEND.to_string(),
                    message: format!("corrupt entry at {}:{}: {e}", path.display(), n + 1),
                })
            })
            .collect()
    }
}

fn dimension_error(expected: usize, actual: usize) -> ComplianceError {
    ComplianceError::VectorStore {
        backend: BACKEND.to_string(),
        message: format!("dimension mismatch: store holds {expected}-d vectors, got {actual}"),
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn add(&self, entries: &[StoredChunk]) -> Result<()> {
        let Some(first) = entries.first() else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;

        let dimensions = match self.checked_manifest().await? {
            Some(manifest) => manifest.dimensions,
            None => {
                tokio::fs::create_dir_all(&self.dir).await?;
                let manifest = StoreManifest {
                    version: MANIFEST_VERSION,
                    embedding_model: self.embedding_model.clone(),
                    dimensions: first.embedding.len(),
                };
                self.write_manifest(&manifest).await?;
                manifest.dimensions
            }
        };

        let mut buf = String::new();
        for entry in entries {
            if entry.embedding.len() != dimensions {
                return Err(dimension_error(dimensions, entry.embedding.len()));
            }
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(ENTRIES_FILE))
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        debug!(dir = %self.dir.display(), count = entries.len(), "appended entries");
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let Some(manifest) = self.checked_manifest().await? else {
            warn!(dir = %self.dir.display(), "vector store is empty; run the ingestion first");
            return Ok(Vec::new());
        };
        if embedding.len() != manifest.dimensions {
            return Err(dimension_error(manifest.dimensions, embedding.len()));
        }

        let entries = self.load_entries().await?;
        let results = rank(entries.iter(), embedding, top_k);
        debug!(scanned = entries.len(), returned = results.len(), "searched file store");
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.load_entries().await?.len())
    }

    async fn entries(&self, limit: usize) -> Result<Vec<StoredChunk>> {
        let mut entries = self.load_entries().await?;
        entries.truncate(limit);
        Ok(entries)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&self.dir).await? {
            tokio::fs::remove_dir_all(&self.dir).await?;
            debug!(dir = %self.dir.display(), "removed vector store");
        }
        Ok(())
    }
}
