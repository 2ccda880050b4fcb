
use std::path::Path;
use tracing::debug;

use crate::AskDocsError;
use crate::chunking::Chunk;
use crate::embeddings::EmbeddingBackend;
use crate::index::{FlatIndex, IndexError};

/// In-memory vector store pairing chunks with rows of a flat index.
///
/// Row `i` of the index holds the embedding of `chunks[i]`, and additions are
/// all-or-nothing so the pairing survives backend failures. Persistence covers
/// the index rows only; restored rows without a matching chunk are skipped at
/// search time.
pub struct VectorStore<E> {
    chunks: Vec<Chunk>,
    index: FlatIndex,
    embedder: E,
}

impl<E: EmbeddingBackend> VectorStore<E> {
    /// Create an empty store, probing the backend once for its dimension
    #[inline]
    pub fn new(embedder: E) -> Result<Self, AskDocsError> {
        let dimension = embedder.dimension().map_err(|error| {
            AskDocsError::Embedding(format!("Failed to determine embedding dimension: {error:#}"))
        })?;
        let index = FlatIndex::new(dimension)?;

        debug!("Created vector store with dimension {dimension}");

        Ok(Self {
            chunks: Vec::new(),
            index,
            embedder,
        })
    }

    /// Number of stored chunks
    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Embed the given chunks in one batch and append them to the store
    #[inline]
    pub fn add(&mut self, chunks: Vec<Chunk>) -> Result<(), AskDocsError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed(&texts)
            .map_err(|error| {
                AskDocsError::Embedding(format!("Failed to embed chunks: {error:#}"))
            })?;

        if embeddings.len() != chunks.len() {
            return Err(AskDocsError::Embedding(format!(
                "Mismatch between chunk and embedding counts: {} vs {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        // The index validates every vector before appending any, so a failure
        // here leaves both the index and the chunk list untouched
        self.index.add(&embeddings)?;
        self.chunks.extend(chunks);

        debug!("Store now holds {} chunks", self.chunks.len());
        Ok(())
    }

    /// Return the `k` stored chunks nearest to the query, nearest first
    #[inline]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Chunk>, AskDocsError> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_embeddings = self
            .embedder
            .embed(&[query.to_string()])
            .map_err(|error| {
                AskDocsError::Embedding(format!("Failed to embed query: {error:#}"))
            })?;
        let query_vector = query_embeddings.first().ok_or_else(|| {
            AskDocsError::Embedding("Embedding backend returned no query vector".to_string())
        })?;

        let (_distances, indices) = self.index.search(query_vector, k)?;

        let results: Vec<Chunk> = indices
            .into_iter()
            .filter_map(|index| usize::try_from(index).ok())
            .filter_map(|index| self.chunks.get(index).cloned())
            .collect();

        debug!("Search returned {} of {k} requested chunks", results.len());
        Ok(results)
    }

    /// Drop all chunks and vectors, keeping the dimension
    #[inline]
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.index.clear();
    }

    /// Write the index rows to disk. The chunk list is not persisted.
    #[inline]
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<(), AskDocsError> {
        self.index.persist(path)?;

        debug!("Persisted {} vectors", self.index.size());
        Ok(())
    }

    /// Replace the index rows with a previously persisted structure. Does
    /// nothing when no file exists at `path`; rejects a structure whose
    /// dimension differs from this store's.
    #[inline]
    pub fn restore<P: AsRef<Path>>(&mut self, path: P) -> Result<(), AskDocsError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No persisted index at {}", path.display());
            return Ok(());
        }

        let index = FlatIndex::load(path)?;

        if index.dimension() != self.index.dimension() {
            return Err(AskDocsError::Index(IndexError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: index.dimension(),
            }));
        }

        debug!("Restored {} vectors", index.size());
        self.index = index;
        Ok(())
    }
}
