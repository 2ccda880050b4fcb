use thiserror::Error;

pub type Result<T> = std::result::Result<T, AskDocsError>;

#[derive(Error, Debug)]
pub enum AskDocsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Document error: {0}")]
    Document(#[from] loader::LoaderError),

    #[error("Chunking error: {0}")]
    Chunking(#[from] chunking::ChunkError),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chunking;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod generation;
pub mod index;
pub mod loader;
pub mod rag;
pub mod session;
pub mod store;
