//! Search orchestration.
//!
//! A search composes the stages in this module: project the library's
//! chunk tree into rows, apply the metadata filter, resolve a query vector
//! (supplied or embedded externally), build the requested index fresh over
//! the filtered rows, and pack ranked hits together with the library's
//! current version.
//!
//! # Module Structure
//!
//! - [`filter`] - Exact-match metadata filtering
//! - [`index`] - Exact and approximate vector indexes
//! - [`request`] - Search request types
//! - [`response`] - Search response types
//! - [`row`] - Row projection from a library snapshot

pub mod filter;
pub mod index;
pub mod request;
pub mod response;
pub mod row;

use std::sync::Arc;

use log::debug;

use crate::embedding::Embedder;
use crate::embedding::bridge::EmbeddingBridge;
use crate::error::{BiblioError, Result};
use crate::search::index::VectorIndex;
use crate::search::index::brute::BruteForceIndex;
use crate::search::index::lsh::LshIndex;
use crate::search::request::{IndexKind, SearchRequest};
use crate::search::response::{Hit, SearchResults};
use crate::search::row::{Row, collect_rows};
use crate::store::Store;

/// Executes searches against a store, embedding query text through the
/// configured provider when no query embedding is supplied.
///
/// The store and embedder are injected; a `Searcher` owns no state beyond
/// them and the bridge used to drive embedding calls. Indexes are built
/// fresh over the current row set on every call, so results always reflect
/// the store state at snapshot time.
pub struct Searcher {
    store: Arc<dyn Store>,
    bridge: EmbeddingBridge,
}

impl Searcher {
    pub fn new(store: Arc<dyn Store>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Ok(Self {
            store,
            bridge: EmbeddingBridge::new(embedder)?,
        })
    }

    /// Run one search. A missing library yields empty hits with
    /// `library_version: None`; validation problems (no query at all,
    /// dimension mismatch, bad LSH tuning) are errors; embedding provider
    /// failures propagate unchanged.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        if request.k == 0 {
            return self.empty_results(request);
        }

        let Some(library) = self.store.get_library(request.library_id)? else {
            return Ok(SearchResults {
                hits: Vec::new(),
                index: request.index,
                library_version: None,
            });
        };

        let mut rows = collect_rows(&library);
        if let Some(filter) = &request.filter {
            rows = filter.apply(rows);
        }
        if rows.is_empty() {
            return self.empty_results(request);
        }

        let query = self.resolve_query(request, rows[0].embedding.len())?;

        let index_hits = match request.index {
            IndexKind::Brute => BruteForceIndex::new(&rows)?.search(&query, request.k)?,
            IndexKind::Lsh => {
                LshIndex::new(&rows, request.lsh)?.search(&query, request.k)?
            }
        };
        debug!(
            "search in library {} over {} rows returned {} hits",
            request.library_id,
            rows.len(),
            index_hits.len()
        );

        let hits = index_hits
            .into_iter()
            .map(|hit| pack_hit(&rows[hit.row], hit.score))
            .collect();

        // Read the version after searching so a caller can detect a write
        // that raced the row snapshot.
        Ok(SearchResults {
            hits,
            index: request.index,
            library_version: self.store.library_version(request.library_id)?,
        })
    }

    fn empty_results(&self, request: &SearchRequest) -> Result<SearchResults> {
        Ok(SearchResults {
            hits: Vec::new(),
            index: request.index,
            library_version: self.store.library_version(request.library_id)?,
        })
    }

    /// Prefer a supplied embedding; otherwise embed the query text through
    /// the external provider with the stored rows' dimensionality as hint.
    fn resolve_query(&self, request: &SearchRequest, dim_hint: usize) -> Result<Vec<f32>> {
        if let Some(embedding) = &request.query_embedding {
            return Ok(embedding.clone());
        }
        let Some(text) = &request.query_text else {
            return Err(BiblioError::invalid_argument(
                "provide either query_text or query_embedding",
            ));
        };
        self.bridge.embed_blocking(text, Some(dim_hint))
    }
}

fn pack_hit(row: &Row, score: f32) -> Hit {
    Hit {
        chunk_id: row.chunk_id,
        document_id: row.document_id,
        library_id: row.library_id,
        text: row.text.clone(),
        metadata: row.metadata.clone(),
        score,
    }
}
