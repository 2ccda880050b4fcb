// Session state for interactive and one-shot question answering
// Holds the live store, the answer engine, ingested document records, and the
// conversation history


use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::chunking::Chunker;
use crate::embeddings::EmbeddingBackend;
use crate::generation::GenerationBackend;
use crate::loader;
use crate::rag::AnswerEngine;
use crate::store::VectorStore;

/// Record of one ingested document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub name: String,
    pub size_bytes: u64,
    pub chunks: usize,
}

/// One side of a conversation exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[inline]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

/// One turn of conversation history
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-file result of a batch ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub name: String,
    pub chunks: usize,
    pub error: Option<String>,
}

impl IngestOutcome {
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Live state of one question-answering session
pub struct Session<E, G> {
    store: VectorStore<E>,
    engine: AnswerEngine<G>,
    chunker: Chunker,
    top_k: usize,
    documents: Vec<DocumentRecord>,
    chat: Vec<ChatTurn>,
}

impl<E: EmbeddingBackend, G: GenerationBackend> Session<E, G> {
    #[inline]
    pub fn new(
        store: VectorStore<E>,
        engine: AnswerEngine<G>,
        chunker: Chunker,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            engine,
            chunker,
            top_k,
            documents: Vec::new(),
            chat: Vec::new(),
        }
    }

    #[inline]
    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    #[inline]
    pub fn chat(&self) -> &[ChatTurn] {
        &self.chat
    }

    /// Load, chunk, and index each file, reporting per-file outcomes. A file
    /// that fails to load or embed records its error and the batch continues.
    #[inline]
    pub fn ingest_files(&mut self, paths: &[PathBuf]) -> Vec<IngestOutcome> {
        let bar = if console::user_attended_stderr() {
            ProgressBar::new(paths.len() as u64).with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Ingesting {msg}")
                    .expect("style template is valid"),
            )
        } else {
            ProgressBar::hidden()
        };

        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            let name = display_name(path);
            bar.set_message(name.clone());

            let outcome = match self.ingest_file(path, &name) {
                Ok(chunks) => IngestOutcome {
                    name,
                    chunks,
                    error: None,
                },
                Err(error) => {
                    warn!("Failed to ingest {}: {error:#}", path.display());
                    IngestOutcome {
                        name,
                        chunks: 0,
                        error: Some(format!("{error:#}")),
                    }
                }
            };

            outcomes.push(outcome);
            bar.inc(1);
        }

        bar.finish_and_clear();
        outcomes
    }

    fn ingest_file(&mut self, path: &Path, name: &str) -> Result<usize> {
        let pages =
            loader::load(path).with_context(|| format!("Failed to load {}", path.display()))?;
        let chunks = self.chunker.chunk_pages(name, &pages);
        let count = chunks.len();

        self.store
            .add(chunks)
            .with_context(|| format!("Failed to index {}", path.display()))?;

        let size_bytes = std::fs::metadata(path).map_or(0, |metadata| metadata.len());

        // Re-ingesting a known name updates its record; the earlier vectors
        // stay in the index since single documents cannot be removed
        if let Some(record) = self
            .documents
            .iter_mut()
            .find(|record| record.name == *name)
        {
            record.size_bytes = size_bytes;
            record.chunks = count;
        } else {
            self.documents.push(DocumentRecord {
                name: name.to_string(),
                size_bytes,
                chunks: count,
            });
        }

        debug!("Ingested {name}: {count} chunks");
        Ok(count)
    }

    /// Record the question, produce a grounded answer, record the answer
    #[inline]
    pub fn ask(&mut self, question: &str) -> Result<String> {
        self.chat.push(ChatTurn {
            role: Role::User,
            content: question.to_string(),
            timestamp: Utc::now(),
        });

        let answer = self
            .engine
            .answer(&self.store, question, self.top_k)
            .context("Failed to answer question")?;

        self.chat.push(ChatTurn {
            role: Role::Assistant,
            content: answer.clone(),
            timestamp: Utc::now(),
        });

        Ok(answer)
    }

    #[inline]
    pub fn clear_chat(&mut self) {
        self.chat.clear();
    }

    /// Drop all documents and vectors. This is the only deletion path; single
    /// documents cannot be removed from the index.
    #[inline]
    pub fn reset_documents(&mut self) {
        self.documents.clear();
        self.store.reset();
    }

    #[inline]
    pub fn save_index<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.store
            .persist(path)
            .with_context(|| format!("Failed to save index to {}", path.display()))
    }

    #[inline]
    pub fn load_index<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.store
            .restore(path)
            .with_context(|| format!("Failed to load index from {}", path.display()))
    }

    /// Render the conversation history as Markdown
    #[inline]
    pub fn transcript_markdown(&self) -> String {
        let turns = self
            .chat
            .iter()
            .map(|turn| {
                format!(
                    "**{}** ({}):\n\n{}",
                    turn.role.display_name(),
                    turn.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                    turn.content
                )
            })
            .join("\n\n");

        format!("# Conversation transcript\n\n{turns}\n")
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
