//! Versioned store for the library/document/chunk tree.
//!
//! Two backends share one contract:
//!
//! - [`memory::MemoryStore`] - libraries held in process memory behind a
//!   global lock plus one lock per library.
//! - [`kv::KvStore`] - libraries serialized into an external key-value
//!   backend, rewriting the whole library subtree on every nested mutation.
//!
//! Both use two lock granularities. The global lock guards existence,
//! creation, deletion, and enumeration of libraries; a per-library lock
//! guards all mutations within that library's document/chunk tree. Writers
//! to different libraries never block each other, and cross-library
//! operations never block unrelated per-library traffic.
//!
//! All reads return deep copies; mutating a returned entity never affects
//! stored state. Lookups of absent ids are a normal outcome reported as
//! `Ok(None)` / `Ok(false)`, so repeated updates and deletes are safe to
//! retry.

pub mod kv;
pub mod memory;

use uuid::Uuid;

use crate::data::{
    Chunk, ChunkPatch, Document, DocumentPatch, Library, LibraryPatch,
};
use crate::error::Result;

/// Contract shared by all store backends.
///
/// Every successful document or chunk mutation refreshes the mutated
/// entity's `updated_at`, the owning document's (for chunk operations), the
/// owning library's, and bumps the library `version` by exactly one. A
/// mutation targeting a missing library, document, or chunk performs no
/// change and no version bump.
pub trait Store: Send + Sync {
    // ---- Library ----

    /// Insert a library, keeping its id. Always succeeds; returns a copy.
    fn create_library(&self, library: Library) -> Result<Library>;

    fn get_library(&self, library_id: Uuid) -> Result<Option<Library>>;

    fn list_libraries(&self) -> Result<Vec<Library>>;

    /// Apply a partial update, merging metadata and preserving `created_at`.
    fn update_library(
        &self,
        library_id: Uuid,
        patch: &LibraryPatch,
    ) -> Result<Option<Library>>;

    /// Remove a library and everything it owns. Returns whether it existed.
    fn delete_library(&self, library_id: Uuid) -> Result<bool>;

    /// Current version of a library without copying its subtree.
    fn library_version(&self, library_id: Uuid) -> Result<Option<u64>> {
        Ok(self.get_library(library_id)?.map(|library| library.version))
    }

    // ---- Document ----

    fn add_document(
        &self,
        library_id: Uuid,
        document: Document,
    ) -> Result<Option<Document>>;

    fn get_document(
        &self,
        library_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Document>>;

    fn list_documents(&self, library_id: Uuid) -> Result<Option<Vec<Document>>>;

    fn update_document(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        patch: &DocumentPatch,
    ) -> Result<Option<Document>>;

    fn delete_document(&self, library_id: Uuid, document_id: Uuid) -> Result<bool>;

    // ---- Chunk ----

    fn add_chunk(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        chunk: Chunk,
    ) -> Result<Option<Chunk>>;

    fn list_chunks(
        &self,
        library_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Vec<Chunk>>>;

    fn update_chunk(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        chunk_id: Uuid,
        patch: &ChunkPatch,
    ) -> Result<Option<Chunk>>;

    fn delete_chunk(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        chunk_id: Uuid,
    ) -> Result<bool>;
}

/// Apply a library patch in place. Shared by both backends so metadata
/// merge semantics cannot drift between them.
pub(crate) fn apply_library_patch(library: &mut Library, patch: &LibraryPatch) {
    if let Some(name) = &patch.name {
        library.name = name.clone();
    }
    if let Some(description) = &patch.description {
        library.description = Some(description.clone());
    }
    if let Some(tags) = &patch.tags {
        library.metadata.tags = Some(tags.clone());
    }
}

/// Apply a document patch in place.
pub(crate) fn apply_document_patch(document: &mut Document, patch: &DocumentPatch) {
    if let Some(title) = &patch.title {
        document.title = title.clone();
    }
    if let Some(category) = &patch.category {
        document.metadata.category = Some(category.clone());
    }
}

/// Apply a chunk patch in place. An absent embedding keeps the prior one.
pub(crate) fn apply_chunk_patch(chunk: &mut Chunk, patch: &ChunkPatch) {
    if let Some(text) = &patch.text {
        chunk.text = text.clone();
    }
    if let Some(embedding) = &patch.embedding {
        chunk.embedding = Some(embedding.clone());
    }
    if let Some(kind) = &patch.kind {
        chunk.metadata.kind = Some(kind.clone());
    }
}
