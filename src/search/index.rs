//! Vector indexes and the similarity primitives they share.
//!
//! Both index types score by cosine similarity computed as the dot product
//! of unit-normalized vectors, and both are built fresh over the current
//! row set on every search call.

pub mod brute;
pub mod lsh;

use crate::error::{BiblioError, Result};
use crate::search::row::Row;

/// A scored match: the index of a row in the set the index was built over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    pub row: usize,
    pub score: f32,
}

/// Top-k search over a fixed row set.
pub trait VectorIndex {
    /// Return up to `k` hits ordered by descending cosine similarity.
    /// `k == 0` yields an empty result; a query whose dimensionality differs
    /// from the indexed rows' is rejected. The relative order of equal
    /// scores is implementation-defined.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>>;
}

/// Scale a vector to unit length. The zero vector is returned unchanged.
pub fn l2_normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vector.to_vec()
    } else {
        vector.iter().map(|x| x / norm).collect()
    }
}

/// Dot product. Equals cosine similarity when both inputs are unit vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// The single embedding dimension shared by every row (0 for an empty set).
/// A row set with mixed dimensions means the store holds malformed
/// embeddings; indexes reject it at build time rather than mis-score it.
pub(crate) fn row_dimension(rows: &[Row]) -> Result<usize> {
    let dimension = rows.first().map(|row| row.embedding.len()).unwrap_or(0);
    for row in rows {
        if row.embedding.len() != dimension {
            return Err(BiblioError::invalid_argument(format!(
                "chunk {} has embedding dimension {}, expected {}",
                row.chunk_id,
                row.embedding.len(),
                dimension
            )));
        }
    }
    Ok(dimension)
}
