//! Argument parsing.

use clap::{Parser, Subcommand};

/// Regulation compliance chatbot over the indexed document corpus.
#[derive(Parser, Debug)]
#[command(name = "compliance", version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// The natural language query to ask (starts interactive mode if omitted)
    pub query: Option<String>,

    /// Override the grounding threshold for this session
    #[arg(long, value_name = "SCORE", value_parser = parse_threshold)]
    pub threshold: Option<f32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

fn parse_threshold(raw: &str) -> Result<f32, String> {
    let value: f32 = raw.parse().map_err(|e| format!("not a number: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside [0, 1]"))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Parse the data directory and index it into the vector store
    Ingest {
        /// Delete the existing store before indexing
        #[arg(long)]
        clear: bool,
    },
    /// Summarize the contents of the vector store
    Inspect {
        /// Number of entries to show
        #[arg(long, default_value_t = 5)]
        sample: usize,
    },
    /// Print the parsed chunks of every corpus file without indexing
    Preview,
}
