// Retrieval-augmented answering
// Retrieves grounding chunks from the vector store, assembles the prompt, and
// delegates to a generation backend

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::debug;

use crate::chunking::Chunk;
use crate::embeddings::EmbeddingBackend;
use crate::generation::GenerationBackend;
use crate::store::VectorStore;

/// Response when retrieval finds nothing relevant
pub const NO_RESULTS_RESPONSE: &str = "No relevant information found for your query.";

/// Answers questions grounded in chunks retrieved from a vector store
pub struct AnswerEngine<G> {
    backend: G,
    temperature: f32,
}

impl<G: GenerationBackend> AnswerEngine<G> {
    #[inline]
    pub fn new(backend: G, temperature: f32) -> Self {
        Self {
            backend,
            temperature,
        }
    }

    /// Answer a query from the `k` nearest stored chunks.
    ///
    /// Zero retrieved chunks and generation failures both produce `Ok` with a
    /// descriptive string; only retrieval failure returns an error.
    #[inline]
    pub fn answer<E: EmbeddingBackend>(
        &self,
        store: &VectorStore<E>,
        query: &str,
        k: usize,
    ) -> Result<String> {
        let chunks = store
            .search(query, k)
            .context("Failed to retrieve context")?;

        if chunks.is_empty() {
            debug!("No chunks retrieved for query");
            return Ok(NO_RESULTS_RESPONSE.to_string());
        }

        let prompt = build_prompt(&chunks, query);
        debug!(
            "Built prompt from {} chunks (length: {})",
            chunks.len(),
            prompt.len()
        );

        match self.backend.generate(&prompt, self.temperature) {
            Ok(response) => Ok(response.into_text()),
            Err(error) => Ok(format!("Error generating response: {error}")),
        }
    }
}

/// Render retrieved chunks into a grounding context, each chunk under a
/// provenance header, and wrap the whole in the instruction prompt
fn build_prompt(chunks: &[Chunk], query: &str) -> String {
    let context = chunks
        .iter()
        .map(|chunk| {
            let page = chunk
                .metadata
                .page
                .map_or_else(|| "Unknown".to_string(), |page| page.to_string());
            format!(
                "Document: {}, Page: {}\n{}",
                chunk.metadata.source, page, chunk.text
            )
        })
        .join("\n\n");

    format!(
        "You are a helpful assistant that answers questions based on the provided documents. \
         Use only the information in the documents to answer the question. \
         If the answer cannot be found in the documents, say so directly.\n\n\
         Documents:\n{context}\n\nQuestion: {query}"
    )
}
