//! Corpus ingestion from a data directory.

mod common;

use std::sync::Arc;

use common::FakeEmbedder;
use compliance_rag::{
    ComplianceError, CorpusManifest, DocumentKind, Indexer, InMemoryVectorStore, VectorStore,
    ingest_corpus, parse_corpus,
};

const MEASUREMENTS: &str = r#"<html><head><title>Parts</title><style>td { color: red }</style></head>
<body>
  <h1>Part Measurements</h1>
  <table>
    <tr><th>Part</th><th>Length (mm)</th><th>Status</th></tr>
    <tr><td>TC-3541-A</td><td>12.5</td><td>Pass</td></tr>
  </table>
</body></html>"#;

fn write_corpus(dir: &std::path::Path) {
    std::fs::write(dir.join("part_measurements_test_corporation.html"), MEASUREMENTS).unwrap();
    std::fs::write(dir.join("FMD_Test_Corporation.pdf"), b"not a pdf").unwrap();
    std::fs::write(dir.join("notes.txt"), "ignore me").unwrap();
}

#[tokio::test]
async fn unknown_and_broken_files_do_not_stop_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());

    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = Indexer::new(Arc::new(FakeEmbedder::new(8)), store.clone());
    let report = ingest_corpus(&indexer, dir.path(), &CorpusManifest::default()).await.unwrap();

    assert_eq!(report.documents, 1);
    assert_eq!(report.chunks_indexed, 1);
    assert_eq!(report.skipped, vec![dir.path().join("notes.txt")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, dir.path().join("FMD_Test_Corporation.pdf"));
    assert!(!report.is_complete());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn measurement_table_keeps_pipe_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());

    let corpus = parse_corpus(dir.path(), &CorpusManifest::default()).await.unwrap();
    let document = &corpus.documents[0];
    assert_eq!(document.kind, DocumentKind::MeasurementTable);
    assert_eq!(document.chunks.len(), 1);

    let chunk = &document.chunks[0];
    assert_eq!(chunk.section_title(), "Full Document");
    assert_eq!(chunk.source(), "part_measurements_test_corporation.html");
    assert!(chunk.content.contains("| TC-3541-A | 12.5 | Pass |"));
    assert!(chunk.content.contains("| --- |"));
    assert!(!chunk.content.contains("color: red"));
}

#[tokio::test]
async fn custom_manifest_classifies_extra_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("extra.html"), "<p>RoHS exemption 7(a)</p>").unwrap();

    let manifest = CorpusManifest::empty().with_entry("extra.html", DocumentKind::MeasurementTable);
    let corpus = parse_corpus(dir.path(), &manifest).await.unwrap();
    assert_eq!(corpus.chunk_count(), 1);
    assert!(corpus.chunks()[0].content.contains("RoHS exemption 7(a)"));
}

#[tokio::test]
async fn empty_directory_indexes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let embedder = Arc::new(FakeEmbedder::new(8));
    let indexer = Indexer::new(embedder.clone(), store);

    let report = ingest_corpus(&indexer, dir.path(), &CorpusManifest::default()).await.unwrap();
    assert_eq!(report.chunks_indexed, 0);
    assert!(report.is_complete());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn missing_data_directory_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_corpus(&dir.path().join("nope"), &CorpusManifest::default()).await.unwrap_err();
    assert!(matches!(err, ComplianceError::Config(_)));
}
