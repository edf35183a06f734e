//! Corpus ingestion: data directory → parsed chunks → index.
//!
//! Files are classified through a [`CorpusManifest`]. Unknown files are
//! skipped. A file that fails to parse is reported and does not stop the
//! remaining files from being indexed.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::document::Chunk;
use crate::error::{ComplianceError, Result};
use crate::indexer::Indexer;
use crate::parser::{CorpusManifest, DocumentKind, parse_document};

/// A successfully parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Path of the source file.
    pub path: PathBuf,
    /// Kind it was parsed as.
    pub kind: DocumentKind,
    /// Chunks produced, in document order.
    pub chunks: Vec<Chunk>,
}

/// A source file that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    /// Path of the source file.
    pub path: PathBuf,
    /// Rendered error.
    pub error: String,
}

/// Outcome of parsing every file of a data directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCorpus {
    /// Parsed files, ordered by file name.
    pub documents: Vec<ParsedDocument>,
    /// Files not listed in the manifest.
    pub skipped: Vec<PathBuf>,
    /// Files that failed to parse.
    pub failures: Vec<IngestFailure>,
}

impl ParsedCorpus {
    /// All chunks of all parsed documents, in order.
    pub fn chunks(&self) -> Vec<Chunk> {
        self.documents.iter().flat_map(|d| d.chunks.iter().cloned()).collect()
    }

    /// Total number of chunks.
    pub fn chunk_count(&self) -> usize {
        self.documents.iter().map(|d| d.chunks.len()).sum()
    }
}

/// Outcome of [`ingest_corpus`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Number of files parsed.
    pub documents: usize,
    /// Number of entries written to the store.
    pub chunks_indexed: usize,
    /// Files not listed in the manifest.
    pub skipped: Vec<PathBuf>,
    /// Files that failed to parse.
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    /// Whether every known file was parsed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Regular files directly inside `dir`, sorted by name.
async fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !tokio::fs::try_exists(dir).await? {
        return Err(ComplianceError::Config(format!(
            "data directory '{}' does not exist",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every file of `data_dir` listed in `manifest`.
///
/// # Errors
///
/// Returns [`ComplianceError::Config`] if `data_dir` does not exist. Per-file
/// parse failures are collected in [`ParsedCorpus::failures`] instead.
pub async fn parse_corpus(data_dir: &Path, manifest: &CorpusManifest) -> Result<ParsedCorpus> {
    let mut corpus = ParsedCorpus::default();

    for path in list_files(data_dir).await? {
        let kind = manifest.classify(&path);
        if kind == DocumentKind::Unsupported {
            info!(path = %path.display(), "skipping unknown file");
            corpus.skipped.push(path);
            continue;
        }

        match parse_document(&path, kind).await {
            Ok(chunks) => {
                info!(path = %path.display(), %kind, chunk_count = chunks.len(), "processed file");
                corpus.documents.push(ParsedDocument { path, kind, chunks });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file that failed to parse");
                corpus.failures.push(IngestFailure { path, error: e.to_string() });
            }
        }
    }

    Ok(corpus)
}

/// Parse `data_dir` and index every chunk produced.
///
/// # Errors
///
/// Returns an error if the directory is missing or embedding or storage
/// fails. Parse failures are reported in [`IngestReport::failures`].
pub async fn ingest_corpus(
    indexer: &Indexer,
    data_dir: &Path,
    manifest: &CorpusManifest,
) -> Result<IngestReport> {
    let corpus = parse_corpus(data_dir, manifest).await?;
    let chunks = corpus.chunks();

    let chunks_indexed = if chunks.is_empty() {
        warn!(data_dir = %data_dir.display(), "no documents found to ingest");
        0
    } else {
        indexer.index(&chunks).await?
    };

    let report = IngestReport {
        documents: corpus.documents.len(),
        chunks_indexed,
        skipped: corpus.skipped,
        failures: corpus.failures,
    };
    info!(
        documents = report.documents,
        chunks_indexed = report.chunks_indexed,
        failures = report.failures.len(),
        "ingestion complete"
    );
    Ok(report)
}
