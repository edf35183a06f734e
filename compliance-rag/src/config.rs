//! Application configuration.
//!
//! [`AppConfig`] is built once at startup, from the environment or through
//! [`AppConfig::builder`], and passed into the components that need it.
//! Nothing reads the environment after that.

use std::fmt;
use std::path::PathBuf;

use crate::error::{ComplianceError, Result};
use crate::gemini::{DEFAULT_BASE_URL, GeminiClient};

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
/// Default generation model.
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash-latest";
/// Default minimum relevance score for a chunk to ground an answer.
pub const DEFAULT_GROUNDING_THRESHOLD: f32 = 0.7;
/// Default number of candidates considered per query.
pub const DEFAULT_TOP_K: usize = 5;
/// Default directory holding the source documents.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default directory of the persistent vector store.
pub const DEFAULT_STORE_DIR: &str = "vector_store";

/// Filesystem locations. Needed by every command, including the ones that
/// never call a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Directory holding the source documents.
    pub data_dir: PathBuf,
    /// Directory of the persistent vector store.
    pub store_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl PathsConfig {
    /// Read `DATA_DIR` and `VECTOR_STORE_DIR` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the paths through `lookup`, falling back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: non_empty(lookup("DATA_DIR")).map(PathBuf::from).unwrap_or(defaults.data_dir),
            store_dir: non_empty(lookup("VECTOR_STORE_DIR"))
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
        }
    }
}

/// Complete configuration of the query and ingestion pipelines.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    /// Gemini API key.
    pub api_key: String,
    /// Embedding model used for both indexing and queries.
    pub embedding_model: String,
    /// Generation model.
    pub llm_model: String,
    /// Minimum relevance score, inclusive, for a chunk to ground an answer.
    pub grounding_threshold: f32,
    /// Number of candidates considered per query.
    pub top_k: usize,
    /// Filesystem locations.
    pub paths: PathsConfig,
    /// Base URL of the Gemini REST API.
    pub api_base_url: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[REDACTED]")
            .field("embedding_model", &self.embedding_model)
            .field("llm_model", &self.llm_model)
            .field("grounding_threshold", &self.grounding_threshold)
            .field("top_k", &self.top_k)
            .field("paths", &self.paths)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl AppConfig {
    /// Create a new builder for constructing an [`AppConfig`].
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::Config`] if `GOOGLE_API_KEY` is missing or a
    /// value is malformed or out of range.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup` instead of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = non_empty(lookup("GOOGLE_API_KEY")).ok_or_else(|| {
            ComplianceError::Config("GOOGLE_API_KEY not found in environment".to_string())
        })?;

        let mut builder = Self::builder().api_key(api_key).paths(PathsConfig::from_lookup(&lookup));

        if let Some(model) = non_empty(lookup("EMBEDDING_MODEL")) {
            builder = builder.embedding_model(model);
        }
        if let Some(model) = non_empty(lookup("LLM_MODEL")) {
            builder = builder.llm_model(model);
        }
        if let Some(raw) = non_empty(lookup("GROUNDING_THRESHOLD")) {
            let threshold = raw.trim().parse::<f32>().map_err(|e| {
                ComplianceError::Config(format!("GROUNDING_THRESHOLD '{raw}' is not a number: {e}"))
            })?;
            builder = builder.grounding_threshold(threshold);
        }
        if let Some(raw) = non_empty(lookup("TOP_K")) {
            let top_k = raw.trim().parse::<usize>().map_err(|e| {
                ComplianceError::Config(format!("TOP_K '{raw}' is not a positive integer: {e}"))
            })?;
            builder = builder.top_k(top_k);
        }
        if let Some(url) = non_empty(lookup("GEMINI_BASE_URL")) {
            builder = builder.api_base_url(url);
        }

        builder.build()
    }

    /// An HTTP client for the configured Gemini endpoint.
    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::with_base_url(self.api_key.clone(), self.api_base_url.clone())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builder for constructing a validated [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AppConfigBuilder {
    api_key: Option<String>,
    embedding_model: String,
    llm_model: String,
    grounding_threshold: f32,
    top_k: usize,
    paths: PathsConfig,
    api_base_url: String,
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            grounding_threshold: DEFAULT_GROUNDING_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            paths: PathsConfig::default(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfigBuilder {
    /// Set the Gemini API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the embedding model.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the generation model.
    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = model.into();
        self
    }

    /// Set the grounding threshold.
    pub fn grounding_threshold(mut self, threshold: f32) -> Self {
        self.grounding_threshold = threshold;
        self
    }

    /// Set the number of candidates considered per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the filesystem locations.
    pub fn paths(mut self, paths: PathsConfig) -> Self {
        self.paths = paths;
        self
    }

    /// Set the source document directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.data_dir = dir.into();
        self
    }

    /// Set the vector store directory.
    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.store_dir = dir.into();
        self
    }

    /// Set the Gemini API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Build the [`AppConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceError::Config`] if:
    /// - the API key is missing or blank
    /// - `grounding_threshold` is outside `[0, 1]`
    /// - `top_k == 0`
    /// - a model name is blank
    pub fn build(self) -> Result<AppConfig> {
        let api_key = non_empty(self.api_key)
            .ok_or_else(|| ComplianceError::Config("api_key is required".to_string()))?;
        if !(0.0..=1.0).contains(&self.grounding_threshold) {
            return Err(ComplianceError::Config(format!(
                "grounding_threshold ({}) must be between 0 and 1",
                self.grounding_threshold
            )));
        }
        if self.top_k == 0 {
            return Err(ComplianceError::Config("top_k must be greater than zero".to_string()));
        }
        if self.embedding_model.trim().is_empty() || self.llm_model.trim().is_empty() {
            return Err(ComplianceError::Config("model names must not be empty".to_string()));
        }

        Ok(AppConfig {
            api_key,
            embedding_model: self.embedding_model,
            llm_model: self.llm_model,
            grounding_threshold: self.grounding_threshold,
            top_k: self.top_k,
            paths: self.paths,
            api_base_url: self.api_base_url,
        })
    }
}
