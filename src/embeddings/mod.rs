// Embeddings module
// Defines the embedding backend contract and the Ollama HTTP client

pub mod ollama;

pub use ollama::OllamaClient;

use anyhow::Result;

/// A batch-capable text embedding backend producing fixed-dimension vectors
pub trait EmbeddingBackend {
    /// Embed a batch of texts, one vector per input, in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the vectors this backend produces
    fn dimension(&self) -> Result<usize>;
}
