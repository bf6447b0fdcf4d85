//! # Biblio
//!
//! An in-process vector search engine layered over a hierarchical,
//! versioned object store (library -> document -> chunk).
//!
//! ## Features
//!
//! - Concurrency-safe store with copy-on-read isolation and per-library
//!   version counters for staleness detection
//! - Writer-preferring reader/writer locking at two granularities
//! - Exact (brute-force) and approximate (random-hyperplane LSH) cosine
//!   similarity search
//! - Exact-match metadata filtering
//! - Pluggable store backends (in-memory, external key-value)
//! - Pluggable embedding providers
mod data;
pub mod embedding;
mod error;
pub mod search;
pub mod store;
pub mod sync;

// Re-exports for the public API
pub use data::{
    Chunk, ChunkMetadata, ChunkPatch, Document, DocumentMetadata, DocumentPatch,
    Library, LibraryMetadata, LibraryPatch,
};
#[cfg(feature = "embeddings-cohere")]
pub use embedding::cohere::CohereEmbedder;
pub use embedding::bridge::EmbeddingBridge;
pub use embedding::{Embedder, PrecomputedEmbedder};
pub use error::{BiblioError, Result};
pub use search::Searcher;
pub use search::filter::MetadataFilter;
pub use search::index::brute::BruteForceIndex;
pub use search::index::lsh::{LshIndex, LshParams};
pub use search::index::{IndexHit, VectorIndex};
pub use search::request::{IndexKind, SearchRequest, SearchRequestBuilder};
pub use search::response::{Hit, SearchResults};
pub use store::Store;
pub use store::kv::{KvBackend, KvStore, MemoryKvBackend};
pub use store::memory::MemoryStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
