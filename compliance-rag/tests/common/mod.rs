//! Deterministic stand-ins for the embedding provider, vector store and model.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use compliance_rag::{
    Chunk, ComplianceError, EmbeddingProvider, EmbeddingTask, LanguageModel, Result,
    SearchResult, StoredChunk, StructuredRequest, VectorStore,
};

pub const FAKE_EMBEDDING_MODEL: &str = "models/fake-embedding";

/// Hash-based embeddings: identical text always maps to the identical vector.
pub struct FakeEmbedder {
    model: String,
    dimensions: usize,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            model: FAKE_EMBEDDING_MODEL.to_string(),
            dimensions,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(8) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ComplianceError::Embedding {
                provider: "fake".to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }
}

/// A store whose search always returns the same scripted candidates.
pub struct ScriptedStore {
    results: Vec<SearchResult>,
    searches: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results, searches: AtomicUsize::new(0) }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for ScriptedStore {
    async fn add(&self, _entries: &[StoredChunk]) -> Result<()> {
        Ok(())
    }

    async fn search(&self, _embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.iter().take(top_k).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.results.len())
    }

    async fn entries(&self, _limit: usize) -> Result<Vec<StoredChunk>> {
        Ok(Vec::new())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// A model that replies with a fixed output and records every request.
pub struct FakeModel {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl FakeModel {
    pub fn replying(raw: impl Into<String>) -> Self {
        Self { reply: Ok(raw.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { reply: Err(message.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<StructuredRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    fn name(&self) -> &str {
        "fake-model"
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(raw) => Ok(raw.clone()),
            Err(message) => Err(ComplianceError::Provider {
                provider: "fake".to_string(),
                status: 503,
                message: message.clone(),
            }),
        }
    }
}

pub fn scored(content: &str, source: &str, section: &str, score: f32) -> SearchResult {
    SearchResult { chunk: Chunk::new(content, source, section), score }
}

/// The declaration chunk of the test corpus.
pub fn lead_chunk(score: f32) -> SearchResult {
    scored(
        "| Part | Substance | CAS | Mass % |\n| --- | --- | --- | --- |\n| TC-3541-A | Lead | 7439-92-1 | 0.1 |",
        "FMD_Test_Corporation.pdf",
        "Full Document",
        score,
    )
}

/// A well-formed answer about lead in TC-3541-A, claiming a confidence the
/// pipeline must not report.
pub const LEAD_ANSWER: &str = r#"{
    "answer": "Part TC-3541-A contains 0.1% Lead (CAS 7439-92-1).",
    "is_compliant": true,
    "confidence": 0.99,
    "sources": [{"file": "FMD_Test_Corporation.pdf", "section": "Full Document"}]
}"#;

/// Write a one-page PDF with each of `lines` set in Helvetica 12pt, separated
/// by a blank line's worth of vertical space.
pub fn write_text_pdf(path: &std::path::Path, lines: &[&str]) {
    let mut content = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("0 -30 Td\n");
        }
        let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
        content.push_str(&format!("({escaped}) Tj\n"));
    }
    content.push_str("ET\n");

    let widths = vec!["500"; 95].join(" ");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{content}endstream", content.len()),
        format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding \
             /FirstChar 32 /LastChar 126 /Widths [{widths}] >>"
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{object}\nendobj\n", i + 1));
    }
    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    std::fs::write(path, pdf).unwrap();
}
