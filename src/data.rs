//! Entity model: libraries, documents, chunks, and their metadata.
//!
//! A `Library` owns an ordered list of `Document`s, each of which owns an
//! ordered list of `Chunk`s. Every metadata struct carries creation and
//! update timestamps plus one domain field. The library-level `version`
//! counter increments exactly once per successful mutation anywhere in the
//! library's subtree and is the staleness signal for anything caching
//! derived structures (such as a search index) over that library.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to a [`Library`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMetadata {
    /// Tags/categories for the library (comma-separated).
    #[serde(default)]
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for LibraryMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            tags: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl LibraryMetadata {
    /// Refresh the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Metadata attached to a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document category/type.
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            category: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl DocumentMetadata {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Metadata attached to a [`Chunk`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Chunk type (e.g. "paragraph", "heading", "list").
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ChunkMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            kind: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ChunkMetadata {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Flatten into the plain key/value mapping the metadata filter
    /// operates on.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(kind) = &self.kind {
            map.insert("type".to_string(), kind.clone());
        }
        map.insert("created_at".to_string(), self.created_at.to_rfc3339());
        map.insert("updated_at".to_string(), self.updated_at.to_rfc3339());
        map
    }
}

/// Top-level container for documents (and by extension, chunks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: LibraryMetadata,
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Increments on any successful write in this library's subtree.
    #[serde(default)]
    pub version: u64,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            metadata: LibraryMetadata::default(),
            documents: Vec::new(),
            version: 0,
        }
    }

    /// Record a successful mutation in this library's subtree: refresh the
    /// library timestamp and bump the version counter by exactly one.
    pub(crate) fn mark_updated(&mut self) {
        self.metadata.touch();
        self.version += 1;
    }
}

/// A logical document that contains chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            metadata: DocumentMetadata::default(),
            chunks: Vec::new(),
        }
    }
}

/// Smallest retrieval unit.
///
/// A chunk without an embedding is a first-class CRUD object but is
/// invisible to search until an embedding is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            embedding: None,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.metadata.kind = Some(kind.into());
        self
    }
}

/// Partial update for a [`Library`]. `None` fields are left unchanged;
/// `created_at` is always preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

/// Partial update for a [`Document`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub category: Option<String>,
}

/// Partial update for a [`Chunk`]. An absent `embedding` keeps the prior
/// embedding unchanged, so callers whose re-embedding provider is
/// unavailable can still update text or metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkPatch {
    pub text: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_library_starts_at_version_zero() {
        let library = Library::new("L");
        assert_eq!(library.version, 0);
        assert!(library.documents.is_empty());
        assert!(library.description.is_none());
    }

    #[test]
    fn test_mark_updated_bumps_version_once() {
        let mut library = Library::new("L");
        library.mark_updated();
        library.mark_updated();
        assert_eq!(library.version, 2);
    }

    #[test]
    fn test_chunk_metadata_map_includes_kind() {
        let chunk = Chunk::new("Paris is beautiful").with_kind("landmark");
        let map = chunk.metadata.to_map();
        assert_eq!(map.get("type"), Some(&"landmark".to_string()));
        assert!(map.contains_key("created_at"));
        assert!(map.contains_key("updated_at"));
    }

    #[test]
    fn test_library_round_trips_through_json() {
        let mut library = Library::new("L");
        let mut document = Document::new("D");
        document
            .chunks
            .push(Chunk::new("hello").with_embedding(vec![1.0, 0.0]));
        library.documents.push(document);

        let serialized = serde_json::to_string(&library).unwrap();
        let restored: Library = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored.id, library.id);
        assert_eq!(restored.documents.len(), 1);
        assert_eq!(
            restored.documents[0].chunks[0].embedding,
            Some(vec![1.0, 0.0])
        );
    }
}
