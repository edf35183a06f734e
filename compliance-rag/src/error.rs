//! Error types for the `compliance-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing, indexing, retrieving or generating.
#[derive(Debug, Error)]
pub enum ComplianceError {
    /// Invalid or missing configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source document could not be read or converted to text.
    #[error("Failed to parse '{}': {message}", path.display())]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while calling the language model.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A provider answered with a non-success HTTP status.
    #[error("{provider} API returned {status}: {message}")]
    Provider {
        /// The provider that produced the error.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// The model output did not match the response schema.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The store was built with a different embedding model than the one configured.
    #[error(
        "Embedding model mismatch: store was built with '{stored}' but '{configured}' is configured"
    )]
    EmbeddingMismatch {
        /// Model recorded in the store manifest.
        stored: String,
        /// Model currently configured.
        configured: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ComplianceError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse { path: path.into(), message: message.into() }
    }
}

/// A convenience result type for compliance RAG operations.
pub type Result<T> = std::result::Result<T, ComplianceError>;
