//! `docqa`: ingest documents and ask questions about them.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa_ai::providers::health_check;
use docqa_ai::Session;
use docqa_core::config::DocQaConfig;
use docqa_core::domain::QueryResponse;

#[derive(Debug, Parser)]
#[command(name = "docqa", version, about = "Ask questions about your documents")]
struct Cli {
    /// TOML config file; DOCQA_* environment variables override it
    #[arg(long, short, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load .pdf/.txt files and rebuild the index
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Answer one question (or run `history` / `clear`)
    Ask { question: String },
    /// Interactive session over stdin
    Chat,
    /// Check that the configured provider is reachable
    Health,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info,docqa_ai=info,docqa_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DocQaConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Health => {
            let message = health_check(&config.provider)?;
            println!("{message}");
        }
        Command::Ingest { files } => {
            let session = Session::from_config(config)?;
            let summary = session.ingest_paths(&files)?;
            print_json(&summary)?;
        }
        Command::Ask { question } => {
            let session = Session::from_config(config)?;
            print_json(&session.query(&question))?;
        }
        Command::Chat => {
            let session = Session::from_config(config)?;
            run_chat(&session)?;
        }
    }
    Ok(())
}

fn run_chat(session: &Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if !input.is_empty() {
            match session.query(input) {
                QueryResponse::Answer { answer, sources } => {
                    writeln!(stdout, "{answer}")?;
                    for (i, s) in sources.iter().enumerate() {
                        writeln!(stdout, "  [{}] {}", i + 1, s.trim())?;
                    }
                }
                QueryResponse::Error { error, code } => writeln!(stdout, "error [{code}]: {error}")?,
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
