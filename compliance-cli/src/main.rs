use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use compliance_cli::{Cli, Command, commands, repl, telemetry};
use compliance_rag::{AppConfig, PathsConfig, QueryPipeline};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose);

    match cli.command {
        Some(Command::Preview) => commands::preview(&PathsConfig::from_env()).await,
        Some(Command::Ingest { clear }) => commands::ingest(&AppConfig::from_env()?, clear).await,
        Some(Command::Inspect { sample }) => {
            commands::inspect(&AppConfig::from_env()?, sample).await?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let config = AppConfig::from_env()?;
            let pipeline = QueryPipeline::from_config(&config)?;
            match cli.query {
                Some(query) => {
                    commands::ask_or_report(&pipeline, &query, cli.threshold, cli.verbose).await
                }
                None => repl::run(&pipeline, cli.threshold, cli.verbose).await?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
