//! Subcommand implementations.

use std::process::ExitCode;

use anyhow::{Context, Result};
use compliance_rag::{
    AppConfig, CorpusManifest, Indexer, PathsConfig, QueryPipeline, ingest_corpus, parse_corpus,
};

use crate::render;

/// Answer one query and print the result.
pub async fn ask(
    pipeline: &QueryPipeline,
    query: &str,
    threshold: Option<f32>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        print!("{}", render::query_header(query));
    }
    let answer = pipeline.ask_with_threshold(query, threshold).await?;
    print!("{}", render::answer(&answer, verbose));
    Ok(())
}

/// Answer one query, printing a failure instead of returning it.
pub async fn ask_or_report(
    pipeline: &QueryPipeline,
    query: &str,
    threshold: Option<f32>,
    verbose: bool,
) {
    if let Err(e) = ask(pipeline, query, threshold, verbose).await {
        eprintln!("Error: {e:#}");
    }
}

/// Parse the data directory and index it. Fails the process if any file
/// could not be parsed.
pub async fn ingest(config: &AppConfig, clear: bool) -> Result<ExitCode> {
    let indexer = Indexer::from_config(config);
    if clear {
        indexer.clear().await.context("failed to clear the vector store")?;
        println!("Cleared vector store at {}", config.paths.store_dir.display());
    }

    println!("Ingesting documents from {}...", config.paths.data_dir.display());
    let report = ingest_corpus(&indexer, &config.paths.data_dir, &CorpusManifest::default())
        .await
        .context("ingestion failed")?;
    print!("{}", render::ingest_report(&report));

    Ok(if report.is_complete() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Print a summary of the vector store.
pub async fn inspect(config: &AppConfig, sample: usize) -> Result<()> {
    let summary = Indexer::from_config(config)
        .inspect(sample)
        .await
        .with_context(|| format!("failed to read {}", config.paths.store_dir.display()))?;
    print!("{}", render::store_summary(&summary));
    Ok(())
}

/// Print the chunks every corpus file parses into. Needs no API key.
pub async fn preview(paths: &PathsConfig) -> Result<ExitCode> {
    println!("--- Checking Markdown Conversion for files in {} ---\n", paths.data_dir.display());
    let corpus = parse_corpus(&paths.data_dir, &CorpusManifest::default()).await?;
    print!("{}", render::corpus_preview(&corpus));
    Ok(if corpus.failures.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
