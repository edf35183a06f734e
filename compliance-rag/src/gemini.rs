//! Gemini embedding and generation providers over the REST API.
//!
//! [`GeminiClient`] holds the HTTP client, API key and base URL.
//! [`GeminiEmbeddingProvider`] implements [`EmbeddingProvider`] with
//! `embedContent` / `batchEmbedContents`, and [`GeminiModel`] implements
//! [`LanguageModel`] with `generateContent` in JSON response mode.
//!
//! # Example
//!
//! ```rust,ignore
//! use compliance_rag::gemini::{GeminiClient, GeminiEmbeddingProvider, GeminiModel};
//!
//! let client = GeminiClient::new("your-api-key");
//! let embedder = GeminiEmbeddingProvider::new(client.clone(), "models/embedding-001");
//! let model = GeminiModel::new(client, "gemini-1.5-flash-latest");
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::embedding::{EmbeddingProvider, EmbeddingTask};
use crate::error::{ComplianceError, Result};
use crate::llm::{LanguageModel, StructuredRequest};

/// The default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Maximum number of texts per `batchEmbedContents` request.
const MAX_BATCH_SIZE: usize = 100;

const PROVIDER: &str = "Gemini";

/// Shared HTTP client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for the public Gemini API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (proxy, emulator).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn method_url(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{method}", self.base_url, model_path(model))
    }

    /// POST `body` to `models/{model}:{method}` and decode the JSON response.
    async fn post<B, R>(&self, model: &str, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.method_url(model, method);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, method, error = %e, "request failed");
                ComplianceError::Provider {
                    provider: PROVIDER.into(),
                    status: e.status().map(|s| s.as_u16()).unwrap_or_default(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, method, %status, "API error");
            return Err(ComplianceError::Provider {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message: detail,
            });
        }

        response.json::<R>().await.map_err(|e| {
            error!(provider = PROVIDER, method, error = %e, "failed to parse response");
            ComplianceError::Provider {
                provider: PROVIDER.into(),
                status: 200,
                message: format!("failed to parse response: {e}"),
            }
        })
    }
}

/// Qualify a bare model id with the `models/` prefix.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self { role: role.map(String::from), parts: vec![Part { text: text.to_string() }] }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Serialize)]
struct BatchEmbedContentsRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn task_type(task: EmbeddingTask) -> &'static str {
    match task {
        EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
        EmbeddingTask::Query => "RETRIEVAL_QUERY",
    }
}

/// Convert a JSON Schema into the OpenAPI subset accepted by `responseSchema`.
///
/// Type names are upper-cased, `["T", "null"]` unions become `T` with
/// `nullable: true`, and keywords Gemini rejects are dropped.
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" | "$schema" | "title" => {}
                    "type" => match value {
                        Value::String(t) => {
                            out.insert(key.clone(), Value::String(t.to_uppercase()));
                        }
                        Value::Array(types) => {
                            let concrete: Vec<&str> = types
                                .iter()
                                .filter_map(Value::as_str)
                                .filter(|t| *t != "null")
                                .collect();
                            if let Some(t) = concrete.first() {
                                out.insert(key.clone(), Value::String(t.to_uppercase()));
                            }
                            if concrete.len() < types.len() {
                                out.insert("nullable".into(), Value::Bool(true));
                            }
                        }
                        other => {
                            out.insert(key.clone(), other.clone());
                        }
                    },
                    "properties" => {
                        let props = value
                            .as_object()
                            .map(|props| {
                                props
                                    .iter()
                                    .map(|(name, prop)| (name.clone(), to_gemini_schema(prop)))
                                    .collect::<serde_json::Map<_, _>>()
                            })
                            .unwrap_or_default();
                        out.insert(key.clone(), Value::Object(props));
                    }
                    "items" => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                    _ => {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

// ── EmbeddingProvider implementation ───────────────────────────────

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingProvider {
    client: GeminiClient,
    model: String,
}

impl GeminiEmbeddingProvider {
    /// Create a provider for `model` (e.g. `models/embedding-001`).
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self { client, model: model.into() }
    }

    fn request(&self, text: &str, task: EmbeddingTask) -> EmbedContentRequest {
        EmbedContentRequest {
            model: model_path(&self.model),
            content: Content::text(None, text),
            task_type: task_type(task),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            text_len = text.len(),
            "embedding single text"
        );

        let response: EmbedContentResponse = self
            .client
            .post(&self.model, "embedContent", &self.request(text, task))
            .await
            .map_err(|e| ComplianceError::Embedding {
                provider: PROVIDER.into(),
                message: e.to_string(),
            })?;

        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH_SIZE) {
            debug!(
                provider = PROVIDER,
                model = %self.model,
                batch_size = batch.len(),
                "embedding batch"
            );

            let request = BatchEmbedContentsRequest {
                requests: batch.iter().map(|text| self.request(text, task)).collect(),
            };
            let response: BatchEmbedContentsResponse = self
                .client
                .post(&self.model, "batchEmbedContents", &request)
                .await
                .map_err(|e| ComplianceError::Embedding {
                    provider: PROVIDER.into(),
                    message: e.to_string(),
                })?;

            if response.embeddings.len() != batch.len() {
                return Err(ComplianceError::Embedding {
                    provider: PROVIDER.into(),
                    message: format!(
                        "API returned {} embeddings for {} inputs",
                        response.embeddings.len(),
                        batch.len()
                    ),
                });
            }
            embeddings.extend(response.embeddings.into_iter().map(|e| e.values));
        }

        Ok(embeddings)
    }
}

// ── LanguageModel implementation ───────────────────────────────────

/// A [`LanguageModel`] backed by Gemini `generateContent` in JSON mode.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: GeminiClient,
    model: String,
}

impl GeminiModel {
    /// Create a model handle for `model` (e.g. `gemini-1.5-flash-latest`).
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self { client, model: model.into() }
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            prompt_len = request.prompt.len(),
            context_len = request.system_instruction.len(),
            "generating structured response"
        );

        let body = GenerateContentRequest {
            system_instruction: Content::text(None, &request.system_instruction),
            contents: vec![Content::text(Some("user"), &request.prompt)],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: "application/json",
                response_schema: to_gemini_schema(&request.schema),
            },
        };

        let response: GenerateContentResponse =
            self.client.post(&self.model, "generateContent", &body).await?;

        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ComplianceError::Generation {
                provider: PROVIDER.into(),
                message: format!("prompt blocked: {reason}"),
            });
        }

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ComplianceError::Generation {
                provider: PROVIDER.into(),
                message: "model returned no candidates".into(),
            }
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ComplianceError::Generation {
                provider: PROVIDER.into(),
                message: format!(
                    "model returned an empty response (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            });
        }

        Ok(text)
    }
}
