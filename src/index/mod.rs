#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Sentinel index used to pad search results when fewer than `k` vectors
/// are stored
pub const INVALID_INDEX: i64 = -1;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Invalid dimension: {0} (must be at least 1)")]
    InvalidDimension(usize),
    #[error("Corrupt index data: vector buffer does not match dimension")]
    Corrupt,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Flat nearest-neighbor index over fixed-dimension vectors.
///
/// Vectors are stored row-major and searched exhaustively by squared
/// Euclidean distance. Append-only: rows can be added or the whole index
/// cleared, never removed individually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    #[inline]
    pub fn new(dimension: usize) -> Result<Self, IndexError> {
        if dimension == 0 {
            return Err(IndexError::InvalidDimension(dimension));
        }

        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors
    #[inline]
    pub fn size(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors to the index. Every vector's dimension is validated
    /// before any row is stored, so a mismatch leaves the index untouched.
    #[inline]
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }

        Ok(())
    }

    /// Find the `k` nearest stored vectors to the query by squared Euclidean
    /// distance. Returns parallel distance and position lists, both of length
    /// `k`, ordered nearest-first with ties broken toward the lower position.
    /// When fewer than `k` vectors are stored the tail is padded with
    /// infinite distances and [`INVALID_INDEX`].
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<i64>), IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        if k == 0 {
            return Ok((Vec::new(), Vec::new()));
        }

        let mut scored: Vec<(f32, i64)> = (0..self.size())
            .map(|row| {
                let offset = row * self.dimension;
                let distance = self.vectors[offset..offset + self.dimension]
                    .iter()
                    .zip(query)
                    .fold(0.0f32, |acc, (value, q)| {
                        let diff = value - q;
                        diff.mul_add(diff, acc)
                    });
                (distance, row as i64)
            })
            .collect();

        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        scored.truncate(k);
        scored.resize(k, (f32::INFINITY, INVALID_INDEX));

        Ok(scored.into_iter().unzip())
    }

    /// Drop all stored vectors, keeping the dimension
    #[inline]
    pub fn clear(&mut self) {
        self.vectors.clear();
    }

    /// Write the index to a file as an opaque binary blob
    #[inline]
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<(), IndexError> {
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Read an index previously written by [`persist`](Self::persist)
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let bytes = fs::read(path)?;
        let index: Self = bincode::deserialize(&bytes)?;

        if index.dimension == 0 || index.vectors.len() % index.dimension != 0 {
            return Err(IndexError::Corrupt);
        }

        Ok(index)
    }
}
