//! VOXPOP command line interface.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voxpop", version, about = "Persona-based synthetic consumer interviews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full research flow: personas, interviews, and reports.
    Run(commands::run::RunArgs),
    /// Generate and print the default interview guide for a topic.
    Guide {
        /// Research topic the guide should cover.
        topic: String,
    },
    /// Print the usable questions from a spreadsheet's first column.
    Inspect {
        /// Path to an xlsx/xls/ods file with one question per row.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => commands::run::execute(args).await,
        Command::Guide { topic } => commands::guide::execute(&topic).await,
        Command::Inspect { file } => commands::inspect::execute(&file),
    }
}
