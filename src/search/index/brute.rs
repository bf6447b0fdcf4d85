//! Exact top-k search by scoring every row.

use std::cmp::Ordering as CmpOrdering;

use crate::error::{BiblioError, Result};
use crate::search::index::{IndexHit, VectorIndex, dot, l2_normalize, row_dimension};
use crate::search::row::Row;

/// Brute-force index: O(N*D) build (normalization), O(N*D) per query.
///
/// Exact by construction; the reference point for the approximate index.
#[derive(Debug)]
pub struct BruteForceIndex {
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl BruteForceIndex {
    /// Build over a row set. All rows must share one embedding dimension;
    /// a mixed-dimension set means the store holds malformed embeddings and
    /// is rejected rather than silently mis-scored.
    pub fn new(rows: &[Row]) -> Result<Self> {
        let dimension = row_dimension(rows)?;
        let vectors: Vec<Vec<f32>> = rows
            .iter()
            .map(|row| l2_normalize(&row.embedding))
            .collect();
        Ok(Self { vectors, dimension })
    }
}

impl VectorIndex for BruteForceIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(BiblioError::invalid_argument(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }

        let query = l2_normalize(query);
        let mut hits: Vec<IndexHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vector)| IndexHit {
                row,
                score: dot(vector, &query),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(CmpOrdering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use uuid::Uuid;

    use super::*;

    fn row(embedding: Vec<f32>) -> Row {
        Row {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            library_id: Uuid::new_v4(),
            text: String::new(),
            metadata: HashMap::new(),
            embedding,
        }
    }

    #[test]
    fn test_exact_match_scores_one() {
        let rows = vec![row(vec![1.0, 0.0]), row(vec![0.0, 1.0])];
        let index = BruteForceIndex::new(&rows).unwrap();

        let hits = index.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].row, 0);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_results_sorted_descending() {
        let rows = vec![
            row(vec![0.0, 1.0]),
            row(vec![1.0, 0.0]),
            row(vec![1.0, 1.0]),
        ];
        let index = BruteForceIndex::new(&rows).unwrap();

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].row, 1);
        assert_eq!(hits[1].row, 2);
        assert_eq!(hits[2].row, 0);
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);
    }

    #[test]
    fn test_k_larger_than_rows_is_clamped() {
        let rows = vec![row(vec![1.0, 0.0])];
        let index = BruteForceIndex::new(&rows).unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 1);
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let rows = vec![row(vec![1.0, 0.0])];
        let index = BruteForceIndex::new(&rows).unwrap();
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let rows = vec![row(vec![1.0, 0.0])];
        let index = BruteForceIndex::new(&rows).unwrap();
        let result = index.search(&[1.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(BiblioError::InvalidArgument(_))));
    }

    #[test]
    fn test_mixed_row_dimensions_rejected_at_build() {
        let rows = vec![row(vec![1.0, 0.0]), row(vec![1.0, 0.0, 0.0])];
        assert!(matches!(
            BruteForceIndex::new(&rows),
            Err(BiblioError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_zero_query_vector_scores_zero() {
        let rows = vec![row(vec![1.0, 0.0])];
        let index = BruteForceIndex::new(&rows).unwrap();
        let hits = index.search(&[0.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].score, 0.0);
    }
}
