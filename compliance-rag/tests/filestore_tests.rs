//! Persistent directory store and indexer behaviour.

mod common;

use std::sync::Arc;

use common::{FAKE_EMBEDDING_MODEL, FakeEmbedder};
use compliance_rag::{
    Chunk, ComplianceError, FileVectorStore, Indexer, InMemoryVectorStore, Retriever, VectorStore,
};

fn corpus() -> Vec<Chunk> {
    vec![
        Chunk::new(
            "Part TC-3541-A contains 0.1% Lead.",
            "FMD_Test_Corporation.pdf",
            "Full Document",
        ),
        Chunk::new(
            "Test Corporation declares no SVHC above 0.1% w/w.",
            "REACH_Certificate_of_Compliance_Test_Corporation.pdf",
            "Declaration",
        ),
        Chunk::new(
            "| Part | Length mm |\n| --- | --- |\n| TC-3541-A | 12.5 |",
            "part_measurements_test_corporation.html",
            "Full Document",
        ),
    ]
}

fn indexer(dir: &std::path::Path) -> (Indexer, Arc<FileVectorStore>) {
    let store = Arc::new(FileVectorStore::new(dir.join("store"), FAKE_EMBEDDING_MODEL));
    (Indexer::new(Arc::new(FakeEmbedder::new(16)), store.clone()), store)
}

#[tokio::test]
async fn missing_store_is_not_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, store) = indexer(dir.path());

    assert!(!indexer.is_indexed().await.unwrap());
    assert_eq!(store.count().await.unwrap(), 0);
    indexer.clear().await.unwrap();
}

#[tokio::test]
async fn index_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, _) = indexer(dir.path());

    assert_eq!(indexer.index(&corpus()).await.unwrap(), 3);
    assert!(indexer.is_indexed().await.unwrap());

    let reopened = FileVectorStore::new(dir.path().join("store"), FAKE_EMBEDDING_MODEL);
    assert_eq!(reopened.count().await.unwrap(), 3);

    let manifest = reopened.manifest().await.unwrap().unwrap();
    assert_eq!(manifest.embedding_model, FAKE_EMBEDDING_MODEL);
    assert_eq!(manifest.dimensions, 16);
}

#[tokio::test]
async fn reindexing_duplicates_entries() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, store) = indexer(dir.path());

    indexer.index(&corpus()).await.unwrap();
    indexer.index(&corpus()).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 6);

    let ids: std::collections::HashSet<String> =
        store.entries(6).await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 6);
}

#[tokio::test]
async fn clear_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, store) = indexer(dir.path());

    indexer.index(&corpus()).await.unwrap();
    indexer.clear().await.unwrap();

    assert!(!indexer.is_indexed().await.unwrap());
    assert!(!store.dir().exists());
}

#[tokio::test]
async fn search_finds_indexed_text() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, store) = indexer(dir.path());
    indexer.index(&corpus()).await.unwrap();

    let retrieval = Retriever::new(Arc::new(FakeEmbedder::new(16)), store)
        .retrieve("Part TC-3541-A contains 0.1% Lead.", None)
        .await
        .unwrap();

    assert_eq!(retrieval.chunks[0].chunk.source(), "FMD_Test_Corporation.pdf");
    assert!((retrieval.max_score - 1.0).abs() < 1e-5);
    assert!(retrieval.chunks.iter().all(|c| (0.0..=1.0).contains(&c.score)));
}

#[tokio::test]
async fn search_with_other_model_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, _) = indexer(dir.path());
    indexer.index(&corpus()).await.unwrap();

    let other = FileVectorStore::new(dir.path().join("store"), "models/text-embedding-004");
    let err = other.search(&[0.1; 16], 5).await.unwrap_err();
    assert!(matches!(
        err,
        ComplianceError::EmbeddingMismatch { ref stored, ref configured }
            if stored == FAKE_EMBEDDING_MODEL && configured == "models/text-embedding-004"
    ));
}

#[tokio::test]
async fn missing_store_retrieves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileVectorStore::new(dir.path().join("missing"), FAKE_EMBEDDING_MODEL));
    assert!(store.search(&[0.1; 16], 5).await.unwrap().is_empty());

    let retrieval = Retriever::new(Arc::new(FakeEmbedder::new(16)), store)
        .retrieve("What is the weight limit for Pluto?", None)
        .await
        .unwrap();
    assert!(retrieval.is_empty());
    assert_eq!(retrieval.max_score, 0.0);
}

#[tokio::test]
async fn cleared_store_retrieves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, store) = indexer(dir.path());
    indexer.index(&corpus()).await.unwrap();
    indexer.clear().await.unwrap();

    let retrieval = Retriever::new(Arc::new(FakeEmbedder::new(16)), store)
        .retrieve("Part TC-3541-A contains 0.1% Lead.", None)
        .await
        .unwrap();
    assert!(retrieval.is_empty());
    assert_eq!(retrieval.max_score, 0.0);
}

#[tokio::test]
async fn dimension_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, store) = indexer(dir.path());
    indexer.index(&corpus()).await.unwrap();

    let err = store.search(&[0.1; 4], 5).await.unwrap_err();
    assert!(err.to_string().contains("dimension mismatch"));
}

#[tokio::test]
async fn inspect_summarizes_store() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, _) = indexer(dir.path());
    let mut chunks = corpus();
    chunks.push(Chunk::new("x".repeat(500), "FMD_Test_Corporation.pdf", "Full Document"));
    indexer.index(&chunks).await.unwrap();

    let summary = indexer.inspect(4).await.unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.samples.len(), 4);
    assert_eq!(summary.samples[3].content.len(), 203);
    assert!(summary.samples[3].content.ends_with("..."));
    assert_eq!(summary.sources, vec![
        "FMD_Test_Corporation.pdf",
        "REACH_Certificate_of_Compliance_Test_Corporation.pdf",
        "part_measurements_test_corporation.html",
    ]);
}

#[tokio::test]
async fn in_memory_store_behaves_the_same() {
    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = Indexer::new(Arc::new(FakeEmbedder::new(16)), store.clone());

    indexer.index(&corpus()).await.unwrap();
    indexer.index(&corpus()).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 6);

    indexer.clear().await.unwrap();
    assert!(!indexer.is_indexed().await.unwrap());
}
