//! Embedding provider abstraction.
//!
//! The search path treats text-to-vector embedding as an external call: a
//! potentially slow network round trip behind an async trait, bridged into
//! the synchronous search path by [`bridge::EmbeddingBridge`]. A failing
//! or unconfigured provider propagates to the caller; the search path never
//! substitutes a default vector.

pub mod bridge;
#[cfg(feature = "embeddings-cohere")]
pub mod cohere;

use async_trait::async_trait;

use crate::error::{BiblioError, Result};

/// Turns text into a fixed-length float vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text`. `dim_hint` is the dimensionality of the vectors
    /// already stored alongside the query; providers that support multiple
    /// output sizes may use it, others ignore it.
    async fn embed(&self, text: &str, dim_hint: Option<usize>) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Provider for deployments where all embeddings are computed upstream.
///
/// Rejects every text-embed request, which forces callers to pass query
/// embeddings explicitly.
#[derive(Debug, Default)]
pub struct PrecomputedEmbedder;

impl PrecomputedEmbedder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Embedder for PrecomputedEmbedder {
    async fn embed(&self, _text: &str, _dim_hint: Option<usize>) -> Result<Vec<f32>> {
        Err(BiblioError::invalid_config(
            "no embedding provider configured; supply a query embedding",
        ))
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}
