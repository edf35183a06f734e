//! Data types for chunks, stored entries, and search results.

use serde::{Deserialize, Serialize};

/// Section title of a chunk that spans the whole source document.
pub const FULL_DOCUMENT: &str = "Full Document";

/// Section title of content that precedes any heading.
pub const GENERAL_SECTION: &str = "General";

/// Provenance of a [`Chunk`].
///
/// `source` and `section_title` together identify where the text came from,
/// but they are not unique: one document may yield several chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// File name of the source document.
    pub source: String,
    /// Enclosing section heading, [`FULL_DOCUMENT`] or [`GENERAL_SECTION`].
    pub section_title: String,
}

/// A unit of parsed document content plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Normalized markdown-like text.
    pub content: String,
    /// Where the content came from.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk from its content and provenance.
    pub fn new(
        content: impl Into<String>,
        source: impl Into<String>,
        section_title: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            metadata: ChunkMetadata { source: source.into(), section_title: section_title.into() },
        }
    }

    /// File name of the source document.
    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    /// Section heading this chunk belongs to.
    pub fn section_title(&self) -> &str {
        &self.metadata.section_title
    }
}

impl AsRef<Chunk> for Chunk {
    fn as_ref(&self) -> &Chunk {
        self
    }
}

/// A [`Chunk`] as persisted by a vector store, with its embedding and generated id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredChunk {
    /// Opaque identifier generated at indexing time.
    pub id: String,
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The vector embedding of the chunk content.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Relevance in `[0, 1]`, higher is more similar.
    pub score: f32,
}

impl AsRef<Chunk> for SearchResult {
    fn as_ref(&self) -> &Chunk {
        &self.chunk
    }
}
