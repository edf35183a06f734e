//! Plain-text rendering of answers, reports and previews.

use std::fmt::Write;

use compliance_rag::{Answer, ComplianceResponse, IngestReport, ParsedCorpus, StoreSummary};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Lines printed before retrieval in verbose mode.
pub fn query_header(query: &str) -> String {
    format!("\nUser Query: {query}\nRetrieving context...\n")
}

/// Retrieval diagnostics printed in verbose mode.
pub fn diagnostics(answer: &Answer) -> String {
    format!(
        "Max Confidence: {:.4}\nDocuments Retrieved: {}\n",
        answer.max_score,
        answer.retrieved.len()
    )
}

/// The framed answer block.
pub fn response(response: &ComplianceResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "ANSWER: {}", response.answer);
    if let Some(compliant) = response.is_compliant {
        let status = if compliant { "COMPLIANT" } else { "NON-COMPLIANT" };
        let _ = writeln!(out, "STATUS: {status}");
    }
    let _ = writeln!(out, "CONFIDENCE: {:.4}", response.confidence);
    if !response.sources.is_empty() {
        let _ = writeln!(out, "\nSOURCES:");
        for (idx, source) in response.sources.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} (Section: {})", idx + 1, source.file, source.section);
        }
    }
    let _ = writeln!(out, "{}\n", rule());
    out
}

/// Everything printed for one answered query.
pub fn answer(answer: &Answer, verbose: bool) -> String {
    let mut out = String::new();
    if verbose {
        out.push_str(&diagnostics(answer));
    }
    out.push_str(&response(&answer.response));
    out
}

/// Outcome of an ingestion run.
pub fn ingest_report(report: &IngestReport) -> String {
    let mut out = String::new();
    for path in &report.skipped {
        let _ = writeln!(out, "Skipping unknown file: {}", file_name(path));
    }
    for failure in &report.failures {
        let _ = writeln!(out, "Error processing {}: {}", file_name(&failure.path), failure.error);
    }
    if report.chunks_indexed == 0 {
        let _ = writeln!(out, "No documents found to ingest.");
    } else {
        let _ = writeln!(
            out,
            "Indexed {} chunks from {} documents.",
            report.chunks_indexed, report.documents
        );
    }
    if report.is_complete() {
        let _ = writeln!(out, "Ingestion complete.");
    } else {
        let _ = writeln!(out, "Ingestion finished with {} failed file(s).", report.failures.len());
    }
    out
}

/// Store overview printed by `inspect`.
pub fn store_summary(summary: &StoreSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total documents in vector store: {}", summary.total);
    if summary.total == 0 {
        let _ = writeln!(out, "The vector store is empty. Run `compliance ingest` first.");
        return out;
    }

    let _ = writeln!(out, "\n--- Sample Documents (first {}) ---", summary.samples.len());
    for (i, entry) in summary.samples.iter().enumerate() {
        let _ = writeln!(out, "\nDocument {}:", i + 1);
        let _ = writeln!(out, "ID: {}", entry.id);
        let _ = writeln!(
            out,
            "Metadata: source={}, section_title={}",
            entry.metadata.source, entry.metadata.section_title
        );
        let _ = writeln!(out, "Content: {}", entry.content);
    }

    let _ = writeln!(out, "\n--- Unique Sources ---");
    for source in &summary.sources {
        let _ = writeln!(out, "- {source}");
    }
    out
}

/// Parsed chunks of every corpus file, as printed by `preview`.
pub fn corpus_preview(corpus: &ParsedCorpus) -> String {
    let mut out = String::new();
    for document in &corpus.documents {
        let _ = writeln!(out, "=== File: {} ({}) ===", file_name(&document.path), document.kind);
        for (i, chunk) in document.chunks.iter().enumerate() {
            let _ = writeln!(out, "--- Chunk {} (Section: {}) ---", i + 1, chunk.section_title());
            let _ = writeln!(out, "{}", chunk.content);
            let _ = writeln!(out, "{}", "-".repeat(40));
        }
        out.push('\n');
    }
    for failure in &corpus.failures {
        let _ = writeln!(out, "Error processing {}: {}\n", file_name(&failure.path), failure.error);
    }
    out
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use compliance_rag::{Chunk, DocumentKind, IngestFailure, ParsedDocument, SearchResult, Source};

    use super::*;

    fn grounded() -> ComplianceResponse {
        ComplianceResponse {
            answer: "Part TC-3541-A contains 0.1% Lead.".to_string(),
            is_compliant: Some(true),
            confidence: 0.9,
            sources: vec![Source {
                file: "FMD_Test_Corporation.pdf".to_string(),
                section: "Full Document".to_string(),
            }],
        }
    }

    #[test]
    fn grounded_answer_block() {
        let expected = format!(
            "\n{rule}\nANSWER: Part TC-3541-A contains 0.1% Lead.\nSTATUS: COMPLIANT\n\
             CONFIDENCE: 0.9000\n\nSOURCES:\n  \
             1. FMD_Test_Corporation.pdf (Section: Full Document)\n\
             {rule}\n\n",
            rule = "=".repeat(50)
        );
        assert_eq!(response(&grounded()), expected);
    }

    #[test]
    fn not_found_block_has_no_status_or_sources() {
        let text = response(&ComplianceResponse::not_found(0.4));
        assert!(text.contains("ANSWER: Information not found."));
        assert!(text.contains("CONFIDENCE: 0.4000"));
        assert!(!text.contains("STATUS:"));
        assert!(!text.contains("SOURCES:"));
    }

    #[test]
    fn non_compliant_status() {
        let mut response_value = grounded();
        response_value.is_compliant = Some(false);
        assert!(response(&response_value).contains("STATUS: NON-COMPLIANT"));
    }

    #[test]
    fn verbose_adds_diagnostics() {
        let answer_value = Answer {
            query: "lead?".to_string(),
            response: grounded(),
            max_score: 0.9,
            retrieved: vec![SearchResult {
                chunk: Chunk::new("Lead 0.1%", "FMD_Test_Corporation.pdf", "Full Document"),
                score: 0.9,
            }],
        };
        let text = answer(&answer_value, true);
        assert!(text.starts_with("Max Confidence: 0.9000\nDocuments Retrieved: 1\n"));
        assert!(!answer(&answer_value, false).contains("Max Confidence"));
    }

    #[test]
    fn ingest_report_lists_failures() {
        let report = IngestReport {
            documents: 1,
            chunks_indexed: 4,
            skipped: vec![PathBuf::from("data/notes.txt")],
            failures: vec![IngestFailure {
                path: PathBuf::from("data/FMD_Test_Corporation.pdf"),
                error: "bad xref".to_string(),
            }],
        };
        let text = ingest_report(&report);
        assert!(text.contains("Skipping unknown file: notes.txt"));
        assert!(text.contains("Error processing FMD_Test_Corporation.pdf: bad xref"));
        assert!(text.contains("Indexed 4 chunks from 1 documents."));
        assert!(text.contains("1 failed file(s)"));
    }

    #[test]
    fn preview_prints_each_chunk() {
        let corpus = ParsedCorpus {
            documents: vec![ParsedDocument {
                path: PathBuf::from("data/REACH_Certificate_of_Compliance_Test_Corporation.pdf"),
                kind: DocumentKind::Certificate,
                chunks: vec![
                    Chunk::new("Test Corporation", "REACH.pdf", "General"),
                    Chunk::new("No SVHC.", "REACH.pdf", "Declaration"),
                ],
            }],
            ..Default::default()
        };
        let text = corpus_preview(&corpus);
        assert!(text.contains(
            "=== File: REACH_Certificate_of_Compliance_Test_Corporation.pdf (certificate) ==="
        ));
        assert!(text.contains("--- Chunk 2 (Section: Declaration) ---\nNo SVHC.\n"));
    }

    #[test]
    fn empty_store_summary() {
        let summary = StoreSummary { total: 0, samples: Vec::new(), sources: Vec::new() };
        assert!(store_summary(&summary).contains("empty"));
    }
}
