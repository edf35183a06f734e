//! Query orchestrator.
//!
//! The [`QueryPipeline`] runs one query through retrieval and answer
//! generation by composing an [`EmbeddingProvider`], a [`VectorStore`] and a
//! [`LanguageModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use compliance_rag::{AppConfig, QueryPipeline};
//!
//! let config = AppConfig::from_env()?;
//! let pipeline = QueryPipeline::from_config(&config)?;
//! let answer = pipeline.ask("What is the Lead content of part TC-3541-A?").await?;
//! println!("{}", answer.response.answer);
//! ```

use std::sync::Arc;

use tracing::info;

use crate::answer::AnswerGenerator;
use crate::config::{AppConfig, DEFAULT_GROUNDING_THRESHOLD, DEFAULT_TOP_K};
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{ComplianceError, Result};
use crate::filestore::FileVectorStore;
use crate::gemini::{GeminiEmbeddingProvider, GeminiModel};
use crate::llm::LanguageModel;
use crate::response::ComplianceResponse;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The answer to one query plus retrieval diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// The query as asked.
    pub query: String,
    /// The structured response.
    pub response: ComplianceResponse,
    /// Best candidate score before threshold filtering.
    pub max_score: f32,
    /// Chunks that cleared the threshold and were given to the model.
    pub retrieved: Vec<SearchResult>,
}

/// Retrieval followed by grounded answer generation.
///
/// Construct one via [`QueryPipeline::builder()`] or
/// [`QueryPipeline::from_config`].
pub struct QueryPipeline {
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Gemini providers over the configured persistent store.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = config.gemini_client();
        Self::builder()
            .embedding_provider(Arc::new(GeminiEmbeddingProvider::new(
                client.clone(),
                config.embedding_model.clone(),
            )))
            .vector_store(Arc::new(FileVectorStore::new(
                &config.paths.store_dir,
                config.embedding_model.clone(),
            )))
            .language_model(Arc::new(GeminiModel::new(client, config.llm_model.clone())))
            .grounding_threshold(config.grounding_threshold)
            .top_k(config.top_k)
            .build()
    }

    /// Answer `query` using the configured grounding threshold.
    ///
    /// # Errors
    ///
    /// Returns an error only if retrieval fails. Generation failures are
    /// reported inside the response.
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        self.ask_with_threshold(query, None).await
    }

    /// Answer `query`, overriding the grounding threshold when `Some`.
    pub async fn ask_with_threshold(&self, query: &str, threshold: Option<f32>) -> Result<Answer> {
        let retrieval = self.retriever.retrieve(query, threshold).await?;
        let response =
            self.generator.generate(query, &retrieval.chunks, retrieval.max_score).await;

        info!(
            retrieved = retrieval.chunks.len(),
            max_score = retrieval.max_score,
            grounded = !response.is_ungrounded(),
            "query completed"
        );

        Ok(Answer {
            query: query.to_string(),
            response,
            max_score: retrieval.max_score,
            retrieved: retrieval.chunks,
        })
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// The provider, store and model are required. Threshold and top-k default to
/// `0.7` and `5`.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = QueryPipeline::builder()
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .language_model(Arc::new(model))
///     .grounding_threshold(0.7)
///     .build()?;
/// ```
pub struct QueryPipelineBuilder {
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    grounding_threshold: f32,
    top_k: usize,
}

impl Default for QueryPipelineBuilder {
    fn default() -> Self {
        Self {
            embedding_provider: None,
            vector_store: None,
            language_model: None,
            grounding_threshold: DEFAULT_GROUNDING_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl QueryPipelineBuilder {
    /// Set the embedding provider. Must be the one the store was built with.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the language model used for answers.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the default grounding threshold.
    pub fn grounding_threshold(mut self, threshold: f32) -> Self {
        self.grounding_threshold = threshold;
        self
    }

    /// Set the number of candidates considered per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Build the [`QueryPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::Config`] if a required field is missing,
    /// the threshold is outside `[0, 1]` or `top_k == 0`.
    pub fn build(self) -> Result<QueryPipeline> {
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            ComplianceError::Config("embedding_provider is required".to_string())
        })?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| ComplianceError::Config("vector_store is required".to_string()))?;
        let language_model = self
            .language_model
            .ok_or_else(|| ComplianceError::Config("language_model is required".to_string()))?;
        if !(0.0..=1.0).contains(&self.grounding_threshold) {
            return Err(ComplianceError::Config(format!(
                "grounding_threshold ({}) must be between 0 and 1",
                self.grounding_threshold
            )));
        }
        if self.top_k == 0 {
            return Err(ComplianceError::Config("top_k must be greater than zero".to_string()));
        }

        let retriever = Retriever::new(embedding_provider, vector_store)
            .top_k(self.top_k)
            .threshold(self.grounding_threshold);
        Ok(QueryPipeline { retriever, generator: AnswerGenerator::new(language_model)? })
    }
}
