use clap::{Parser, Subcommand};
use std::path::PathBuf;

use askdocs::Result;
use askdocs::commands::{ask, chat};
use askdocs::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "askdocs")]
#[command(about = "Ask questions about your local documents from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama, Gemini, chunking, and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ask a single question about the given documents
    Ask {
        /// The question to answer
        question: String,
        /// Document to ingest; repeat for multiple files
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        /// Number of chunks to retrieve as context
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Ingest documents, then answer questions interactively
    Chat {
        /// Document to ingest; repeat for multiple files
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ask {
            question,
            files,
            top_k,
        } => {
            ask(&question, &files, top_k)?;
        }
        Commands::Chat { files } => {
            chat(&files)?;
        }
    }

    Ok(())
}
