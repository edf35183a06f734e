//! Command-line front end for `compliance-rag`.
//!
//! The `compliance` binary answers a single query, runs an interactive
//! query loop, or manages the document index (`ingest`, `inspect`, `preview`).

pub mod cli;
pub mod commands;
pub mod render;
pub mod repl;
pub mod telemetry;

pub use cli::{Cli, Command};
