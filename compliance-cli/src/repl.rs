//! Interactive query loop.

use anyhow::Result;
use compliance_rag::QueryPipeline;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::commands;

const PROMPT: &str = "Query > ";

/// Whether `line` asks to leave the loop.
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Read queries until `exit`, `quit`, Ctrl-C or Ctrl-D.
///
/// A failing query is reported and the loop continues.
pub async fn run(pipeline: &QueryPipeline, threshold: Option<f32>, verbose: bool) -> Result<()> {
    println!("Welcome to the Regulation Compliance Chatbot CLI.");
    println!("Type 'exit' or 'quit' to stop.");

    let mut rl = DefaultEditor::new()?;
    loop {
        println!();
        match rl.readline(PROMPT) {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if is_exit_command(query) {
                    break;
                }
                let _ = rl.add_history_entry(query);

                commands::ask_or_report(pipeline, query, threshold, verbose).await;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands_are_case_insensitive() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command(" QUIT "));
        assert!(!is_exit_command("exit strategy for lead"));
    }
}
