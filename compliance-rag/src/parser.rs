//! Source document parsing.
//!
//! [`parse_document`] turns a file of a declared [`DocumentKind`] into
//! [`Chunk`]s. Single-section kinds produce exactly one chunk titled
//! [`FULL_DOCUMENT`]; certificates are split on their headings.
//! [`CorpusManifest`] maps the known corpus file names to their kinds.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunking::sectioned_chunks;
use crate::document::{Chunk, FULL_DOCUMENT};
use crate::error::{ComplianceError, Result};
use crate::{html, pdf};

/// The declared type of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Material declaration PDF, indexed as a single chunk.
    Declaration,
    /// Certificate of compliance PDF, split into one chunk per section.
    Certificate,
    /// HTML page of measurement tables, indexed as a single chunk.
    MeasurementTable,
    /// Anything outside the known corpus. Parsing it is a no-op.
    Unsupported,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Declaration => "declaration",
            Self::Certificate => "certificate",
            Self::MeasurementTable => "measurement table",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// File-name to [`DocumentKind`] registry for the closed corpus.
///
/// The default manifest lists the three documents of the Test Corporation
/// corpus. Unknown files classify as [`DocumentKind::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusManifest {
    entries: HashMap<String, DocumentKind>,
}

impl Default for CorpusManifest {
    fn default() -> Self {
        Self::empty()
            .with_entry("FMD_Test_Corporation.pdf", DocumentKind::Declaration)
            .with_entry(
                "REACH_Certificate_of_Compliance_Test_Corporation.pdf",
                DocumentKind::Certificate,
            )
            .with_entry("part_measurements_test_corporation.html", DocumentKind::MeasurementTable)
    }
}

impl CorpusManifest {
    /// A manifest with no entries.
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Register a file name with its kind.
    pub fn with_entry(mut self, file_name: impl Into<String>, kind: DocumentKind) -> Self {
        self.entries.insert(file_name.into(), kind);
        self
    }

    /// Classify a file by its name.
    pub fn classify(&self, path: &Path) -> DocumentKind {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| self.entries.get(name).copied())
            .unwrap_or(DocumentKind::Unsupported)
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn source_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Parse a source file into chunks according to its declared kind.
///
/// # Errors
///
/// Returns [`ComplianceError::Parse`] if the file cannot be opened or
/// converted. [`DocumentKind::Unsupported`] never fails and yields no chunks.
pub async fn parse_document(path: &Path, kind: DocumentKind) -> Result<Vec<Chunk>> {
    let source = source_name(path);

    let chunks = match kind {
        DocumentKind::Declaration => {
            let markdown = pdf::extract_markdown(path).await?;
            vec![Chunk::new(markdown, source, FULL_DOCUMENT)]
        }
        DocumentKind::Certificate => {
            let markdown = pdf::extract_markdown(path).await?;
            sectioned_chunks(&source, &markdown)
        }
        DocumentKind::MeasurementTable => {
            let html = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ComplianceError::parse(path, format!("failed to read HTML: {e}")))?;
            vec![Chunk::new(html::html_to_markdown(&html), source, FULL_DOCUMENT)]
        }
        DocumentKind::Unsupported => {
            debug!(path = %path.display(), "skipping unsupported document");
            return Ok(Vec::new());
        }
    };

    debug!(path = %path.display(), %kind, chunk_count = chunks.len(), "parsed document");
    Ok(chunks)
}
