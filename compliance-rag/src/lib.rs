//! # compliance-rag
//!
//! Grounded question answering over a small corpus of compliance documents.
//!
//! ## Overview
//!
//! Source documents (material declarations, certificates of compliance and
//! HTML measurement tables) are parsed into [`Chunk`]s, embedded and stored in
//! a directory-backed vector store. A query is answered only from chunks
//! whose relevance reaches the grounding threshold; otherwise the answer says
//! the information was not found.
//!
//! - [`parse_document`] / [`ingest_corpus`] - documents → chunks → index
//! - [`Indexer`] - embed, persist, inspect, clear
//! - [`Retriever`] - top-k search with an inclusive threshold gate
//! - [`AnswerGenerator`] - schema-validated structured answers
//! - [`QueryPipeline`] - retrieval followed by generation for one query
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use compliance_rag::{AppConfig, QueryPipeline};
//!
//! # async fn run() -> compliance_rag::Result<()> {
//! let config = AppConfig::from_env()?;
//! let pipeline = QueryPipeline::from_config(&config)?;
//! let answer = pipeline.ask("Does the REACH certificate declare any SVHC?").await?;
//! println!("{} (confidence {:.4})", answer.response.answer, answer.response.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! ## Providers
//!
//! Embedding and generation sit behind the [`EmbeddingProvider`] and
//! [`LanguageModel`] traits. The [`gemini`] module implements both over the
//! Gemini REST API; tests substitute deterministic fakes.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filestore;
pub mod gemini;
pub mod html;
pub mod indexer;
pub mod ingest;
pub mod inmemory;
pub mod llm;
pub mod parser;
pub mod pdf;
pub mod pipeline;
pub mod response;
pub mod retriever;
pub mod schema;
pub mod vectorstore;

pub use answer::AnswerGenerator;
pub use config::{AppConfig, AppConfigBuilder, PathsConfig};
pub use document::{Chunk, ChunkMetadata, SearchResult, StoredChunk};
pub use embedding::{EmbeddingProvider, EmbeddingTask};
pub use error::{ComplianceError, Result};
pub use filestore::FileVectorStore;
pub use gemini::{GeminiClient, GeminiEmbeddingProvider, GeminiModel};
pub use indexer::{EntryPreview, Indexer, StoreSummary};
pub use ingest::{
    IngestFailure, IngestReport, ParsedCorpus, ParsedDocument, ingest_corpus, parse_corpus,
};
pub use inmemory::InMemoryVectorStore;
pub use llm::{LanguageModel, StructuredRequest};
pub use parser::{CorpusManifest, DocumentKind, parse_document};
pub use pipeline::{Answer, QueryPipeline, QueryPipelineBuilder};
pub use response::{ComplianceResponse, Source};
pub use retriever::{Retrieval, Retriever};
pub use vectorstore::VectorStore;
