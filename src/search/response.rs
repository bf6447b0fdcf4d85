//! Search response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::search::request::IndexKind;

/// One ranked match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub library_id: Uuid,
    pub text: String,
    pub metadata: HashMap<String, String>,
    /// Cosine similarity between the query and this chunk's embedding.
    pub score: f32,
}

/// Ranked hits plus the library version observed after the search.
///
/// `library_version` is read freshly once results are packed, not from the
/// snapshot the rows were built from, so a caller comparing it against a
/// cached version can detect a write that raced the search. `None` means
/// the library does not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
    pub index: IndexKind,
    pub library_version: Option<u64>,
}
