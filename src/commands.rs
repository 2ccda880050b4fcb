// Command layer for the one-shot and interactive question answering flows

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::chunking::Chunker;
use crate::config::Config;
use crate::embeddings::{EmbeddingBackend, OllamaClient};
use crate::generation::{GeminiClient, GenerationBackend};
use crate::rag::AnswerEngine;
use crate::session::{IngestOutcome, Session};
use crate::store::VectorStore;

/// Answer a single question about the given documents
#[inline]
pub fn ask(question: &str, files: &[PathBuf], top_k: Option<usize>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let mut session = build_session(&config, top_k)?;

    report_ingestion(&session.ingest_files(files));

    let answer = session.ask(question)?;
    println!("\n{answer}");

    Ok(())
}

/// Ingest the given documents, then answer questions in a loop
#[inline]
pub fn chat(files: &[PathBuf]) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let mut session = build_session(&config, None)?;

    report_ingestion(&session.ingest_files(files));

    println!();
    println!(
        "{}",
        style("Ask questions about your documents. Type /help for commands, /quit to exit.")
            .dim()
    );

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(command, &mut session) {
                break;
            }
            continue;
        }

        match session.ask(line) {
            Ok(answer) => println!("\n{answer}\n"),
            Err(error) => println!("{} {error:#}\n", style("Error:").red()),
        }
    }

    Ok(())
}

/// Wire config into a live session: Ollama embeddings, Gemini generation
fn build_session(
    config: &Config,
    top_k: Option<usize>,
) -> Result<Session<OllamaClient, GeminiClient>> {
    let embedder = OllamaClient::new(&config.ollama)?;
    let store = VectorStore::new(embedder).context("Failed to initialize vector store")?;

    let backend = GeminiClient::new(&config.gemini)?;
    let engine = AnswerEngine::new(backend, config.gemini.temperature);

    let chunker = Chunker::from_config(&config.chunking)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    info!("Session ready (top_k: {top_k})");
    Ok(Session::new(store, engine, chunker, top_k))
}

fn report_ingestion(outcomes: &[IngestOutcome]) {
    for outcome in outcomes {
        match &outcome.error {
            None => println!(
                "{} {} ({} chunks)",
                style("✓").green(),
                outcome.name,
                outcome.chunks
            ),
            Some(error) => println!("{} {}: {}", style("✗").red(), outcome.name, error),
        }
    }
}

/// Dispatch a `/command` line. Returns false when the loop should exit.
fn handle_command<E, G>(command: &str, session: &mut Session<E, G>) -> bool
where
    E: EmbeddingBackend,
    G: GenerationBackend,
{
    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or_default();
    let argument = parts
        .next()
        .map(str::trim)
        .filter(|argument| !argument.is_empty());

    match name {
        "quit" | "exit" => return false,
        "help" => print_help(),
        "docs" => {
            if session.documents().is_empty() {
                println!("No documents ingested.");
            } else {
                for record in session.documents() {
                    println!(
                        "  {} ({} bytes, {} chunks)",
                        record.name, record.size_bytes, record.chunks
                    );
                }
            }
        }
        "clear" => {
            session.clear_chat();
            println!("Chat history cleared.");
        }
        "reset" => {
            session.reset_documents();
            println!("Documents and index cleared.");
        }
        "save" => match argument {
            Some(path) => match session.save_index(path) {
                Ok(()) => println!("Index saved to {path}."),
                Err(error) => println!("{} {error:#}", style("Error:").red()),
            },
            None => println!("Usage: /save <path>"),
        },
        "load" => match argument {
            Some(path) => match session.load_index(path) {
                Ok(()) => println!("Index loaded from {path}."),
                Err(error) => println!("{} {error:#}", style("Error:").red()),
            },
            None => println!("Usage: /load <path>"),
        },
        "transcript" => match argument {
            Some(path) => match fs::write(path, session.transcript_markdown()) {
                Ok(()) => println!("Transcript written to {path}."),
                Err(error) => println!("{} {error:#}", style("Error:").red()),
            },
            None => println!("Usage: /transcript <path>"),
        },
        unknown => println!("Unknown command: /{unknown}. Type /help for commands."),
    }

    true
}

fn print_help() {
    println!("Commands:");
    println!("  /docs              List ingested documents");
    println!("  /clear             Clear chat history");
    println!("  /reset             Clear documents and index");
    println!("  /save <path>       Save the index to a file");
    println!("  /load <path>       Load the index from a file");
    println!("  /transcript <path> Write the conversation as Markdown");
    println!("  /quit              Exit");
}
