//! Approximate top-k search via random-hyperplane locality-sensitive
//! hashing.
//!
//! Build: T independent hash tables, each with P random unit hyperplanes.
//! A vector hashes per table to a P-bit key (one sign bit per hyperplane)
//! and lands in that table's bucket. A query probes its own bucket in each
//! table, unions the candidates, and ranks them by exact cosine similarity.
//!
//! Complexity: O(N*T*P*D) build, O(T*P*D) hashing plus O(C*D) scoring per
//! query for C candidates, O(N*T) bucket space plus O(T*P*D) plane storage.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{BiblioError, Result};
use crate::search::index::{IndexHit, VectorIndex, dot, l2_normalize, row_dimension};
use crate::search::row::Row;

/// Tuning for [`LshIndex`]. Plane vectors are Gaussian-sampled from `seed`,
/// so a fixed seed gives a fully deterministic bucket layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LshParams {
    #[serde(default = "LshParams::default_tables")]
    pub tables: usize,
    #[serde(default = "LshParams::default_planes")]
    pub planes: usize,
    #[serde(default = "LshParams::default_seed")]
    pub seed: u64,
}

impl LshParams {
    fn default_tables() -> usize {
        8
    }

    fn default_planes() -> usize {
        12
    }

    fn default_seed() -> u64 {
        42
    }
}

impl Default for LshParams {
    fn default() -> Self {
        Self {
            tables: Self::default_tables(),
            planes: Self::default_planes(),
            seed: Self::default_seed(),
        }
    }
}

/// Random-hyperplane LSH index for cosine similarity.
#[derive(Debug)]
pub struct LshIndex {
    vectors: Vec<Vec<f32>>,
    dimension: usize,
    // planes[table][plane] is a unit vector in R^dimension.
    planes: Vec<Vec<Vec<f32>>>,
    buckets: Vec<HashMap<u64, Vec<usize>>>,
}

impl LshIndex {
    pub fn new(rows: &[Row], params: LshParams) -> Result<Self> {
        if params.tables == 0 {
            return Err(BiblioError::invalid_argument(
                "lsh table count must be at least 1",
            ));
        }
        if params.planes == 0 || params.planes > 64 {
            return Err(BiblioError::invalid_argument(
                "lsh plane count must be between 1 and 64",
            ));
        }

        let dimension = row_dimension(rows)?;
        let vectors: Vec<Vec<f32>> = rows
            .iter()
            .map(|row| l2_normalize(&row.embedding))
            .collect();

        let mut rng = StdRng::seed_from_u64(params.seed);
        let planes: Vec<Vec<Vec<f32>>> = (0..params.tables)
            .map(|_| {
                (0..params.planes)
                    .map(|_| {
                        let plane: Vec<f32> = (0..dimension)
                            .map(|_| rng.sample::<f32, _>(StandardNormal))
                            .collect();
                        l2_normalize(&plane)
                    })
                    .collect()
            })
            .collect();

        let mut buckets: Vec<HashMap<u64, Vec<usize>>> =
            vec![HashMap::new(); params.tables];
        for (row, vector) in vectors.iter().enumerate() {
            for (table, table_planes) in planes.iter().enumerate() {
                let key = hash_key(vector, table_planes);
                buckets[table].entry(key).or_default().push(row);
            }
        }

        Ok(Self {
            vectors,
            dimension,
            planes,
            buckets,
        })
    }
}

/// Concatenate one sign bit per hyperplane into a P-bit bucket key.
fn hash_key(vector: &[f32], planes: &[Vec<f32>]) -> u64 {
    let mut key = 0u64;
    for (bit, plane) in planes.iter().enumerate() {
        if dot(vector, plane) >= 0.0 {
            key |= 1 << bit;
        }
    }
    key
}

impl VectorIndex for LshIndex {
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

        let mut candidates: HashSet<usize> = HashSet::new();
        for (table, table_planes) in self.planes.iter().enumerate() {
            let key = hash_key(&query, table_planes);
            if let Some(bucket) = self.buckets[table].get(&key) {
                candidates.extend(bucket.iter().copied());
            }
        }

        // An empty union is an empty result; any fallback to exact search
        // is the caller's policy, not this index's.
        let mut hits: Vec<IndexHit> = candidates
            .into_iter()
            .map(|row| IndexHit {
                row,
                score: dot(&self.vectors[row], &query),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(CmpOrdering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}
