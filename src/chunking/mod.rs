
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

use crate::loader::DocumentPage;

/// Separator priority for recursive splitting, coarsest first. The empty
/// string is the hard-cut fallback when nothing else matches.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// Represents a chunk of document text ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// The chunk text
    pub text: String,
    /// Provenance of the text
    pub metadata: ChunkMetadata,
}

/// Provenance metadata carried by every chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMetadata {
    /// Display name of the originating document
    pub source: String,
    /// 1-based page number, when the source format has pages
    pub page: Option<u32>,
}

/// Configuration for document chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap in characters between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Chunk overlap ({0}) must be less than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
}

/// Splits document text into bounded, overlapping chunks along content-aware
/// boundaries: paragraphs first, then lines, then sentence punctuation, then
/// words, cutting mid-word only when a single token exceeds the chunk size.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    #[inline]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkError> {
        if chunk_overlap >= chunk_size {
            return Err(ChunkError::OverlapTooLarge(chunk_overlap, chunk_size));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Result<Self, ChunkError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Chunk the pages of a loaded document, stamping each chunk with the
    /// document's display name and the page it came from. Empty pages
    /// produce no chunks; an empty document produces an empty result.
    #[inline]
    pub fn chunk_pages(&self, source: &str, pages: &[DocumentPage]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            if page.text.trim().is_empty() {
                continue;
            }

            for text in self.split_text(&page.text) {
                if text.trim().is_empty() {
                    continue;
                }

                chunks.push(Chunk {
                    text,
                    metadata: ChunkMetadata {
                        source: source.to_string(),
                        page: page.page,
                    },
                });
            }
        }

        debug!("Chunked '{}' into {} chunks", source, chunks.len());

        chunks
    }

    /// Split raw text into pieces of at most `chunk_size` characters, with
    /// consecutive pieces sharing up to `chunk_overlap` trailing characters.
    /// With zero overlap the pieces concatenate back to the input exactly.
    #[inline]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let units = self.split_recursive(text, SEPARATORS);
        self.merge_units(units)
    }

    /// Break text into units no larger than `chunk_size`, trying each
    /// separator in priority order and recursing into oversized pieces with
    /// the finer-grained separators that remain.
    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((separator, rest)) = separators.split_first() else {
            return self.hard_cut(text);
        };

        if separator.is_empty() {
            return self.hard_cut(text);
        }

        if !text.contains(separator) {
            return self.split_recursive(text, rest);
        }

        let mut units = Vec::new();
        for piece in text.split_inclusive(separator) {
            if char_len(piece) <= self.chunk_size {
                units.push(piece.to_string());
            } else {
                units.extend(self.split_recursive(piece, rest));
            }
        }

        units
    }

    /// Last-resort splitting for text with no usable separators. Cuts every
    /// `chunk_size` characters, retreating to the last whitespace inside the
    /// slice when the cut would land mid-word.
    fn hard_cut(&self, text: &str) -> Vec<String> {
        let mut units = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let mut end = rest
                .char_indices()
                .nth(self.chunk_size)
                .map_or(rest.len(), |(offset, _)| offset);

            if end < rest.len() {
                let next_is_whitespace = rest
                    .get(end..)
                    .and_then(|tail| tail.chars().next())
                    .is_some_and(char::is_whitespace);
                let slice = rest.get(..end).unwrap_or(rest);

                if !next_is_whitespace {
                    if let Some(pos) = slice.rfind(char::is_whitespace) {
                        end = pos
                            + slice
                                .get(pos..)
                                .and_then(|tail| tail.chars().next())
                                .map_or(1, char::len_utf8);
                    }
                }
            }

            units.push(rest.get(..end).unwrap_or(rest).to_string());
            rest = rest.get(end..).unwrap_or("");
        }

        units
    }

    /// Greedily pack units into chunks up to `chunk_size`, carrying a window
    /// of trailing units no larger than `chunk_overlap` into the next chunk.
    fn merge_units(&self, units: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for unit in units {
            let unit_len = char_len(&unit);

            if total + unit_len > self.chunk_size && !window.is_empty() {
                chunks.push(window.iter().map(String::as_str).collect());

                while total > self.chunk_overlap
                    || (total + unit_len > self.chunk_size && total > 0)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(&front);
                }
            }

            total += unit_len;
            window.push_back(unit);
        }

        if !window.is_empty() {
            chunks.push(window.iter().map(String::as_str).collect());
        }

        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
