// Generation module
// Defines the generation backend contract, the response-shape union, and the
// Gemini HTTP client

pub mod gemini;

#[cfg(test)]
mod tests;

pub use gemini::GeminiClient;

use anyhow::Result;
use serde::Deserialize;

/// A generative text backend invoked with a fully-constructed prompt
pub trait GenerationBackend {
    fn generate(&self, prompt: &str, temperature: f32) -> Result<GenerationResponse>;
}

/// The response shapes a generation backend may produce.
///
/// Backends differ in how they expose generated text: a structured list of
/// generations, a direct text field, or something else entirely. Variants are
/// tried in declaration order when deserializing, so the richer shape wins
/// when both would match.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GenerationResponse {
    Generations { generations: Vec<Generation> },
    Direct { text: String },
    Other(serde_json::Value),
}

/// One entry in a structured generations list
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Generation {
    pub text: String,
}

impl GenerationResponse {
    /// Extract the generated text: the first entry of the generations list,
    /// then the direct text field, then the raw response stringified. Always
    /// yields some string.
    #[inline]
    pub fn into_text(self) -> String {
        match self {
            Self::Generations { generations } => generations
                .into_iter()
                .next()
                .map(|generation| generation.text)
                .unwrap_or_default(),
            Self::Direct { text } => text,
            Self::Other(value) => value.to_string(),
        }
    }
}
