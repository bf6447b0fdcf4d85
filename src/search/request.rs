//! Search request types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::search::filter::MetadataFilter;
use crate::search::index::lsh::LshParams;

fn default_k() -> usize {
    5
}

/// Which index to build over the row set for this search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Exact search: score every row.
    #[default]
    Brute,
    /// Approximate search: random-hyperplane LSH with exact re-ranking.
    Lsh,
}

/// Request model for a library search.
///
/// At least one of `query_text` and `query_embedding` is required; a
/// supplied embedding takes precedence and skips the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub library_id: Uuid,
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub query_embedding: Option<Vec<f32>>,
    /// Maximum number of hits to return. Zero short-circuits to an empty
    /// result without building an index.
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub index: IndexKind,
    /// Tuning for the approximate index; ignored for [`IndexKind::Brute`].
    #[serde(default)]
    pub lsh: LshParams,
    /// Exact-match metadata filter applied before index construction.
    #[serde(default)]
    pub filter: Option<MetadataFilter>,
}

impl SearchRequest {
    pub fn new(library_id: Uuid) -> Self {
        Self {
            library_id,
            query_text: None,
            query_embedding: None,
            k: default_k(),
            index: IndexKind::default(),
            lsh: LshParams::default(),
            filter: None,
        }
    }

    pub fn builder(library_id: Uuid) -> SearchRequestBuilder {
        SearchRequestBuilder {
            request: Self::new(library_id),
        }
    }
}

pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn query_text(mut self, text: impl Into<String>) -> Self {
        self.request.query_text = Some(text.into());
        self
    }

    pub fn query_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.request.query_embedding = Some(embedding);
        self
    }

    pub fn k(mut self, k: usize) -> Self {
        self.request.k = k;
        self
    }

    pub fn index(mut self, index: IndexKind) -> Self {
        self.request.index = index;
        self
    }

    pub fn lsh_params(mut self, params: LshParams) -> Self {
        self.request.lsh = params;
        self
    }

    pub fn filter(mut self, filter: MetadataFilter) -> Self {
        self.request.filter = Some(filter);
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}
