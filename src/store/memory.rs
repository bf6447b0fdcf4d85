//! In-memory store backend.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::data::{
    Chunk, ChunkPatch, Document, DocumentPatch, Library, LibraryPatch,
};
use crate::error::Result;
use crate::store::{
    Store, apply_chunk_patch, apply_document_patch, apply_library_patch,
};
use crate::sync::RwLock;

type LibraryCell = Arc<RwLock<Library>>;

/// In-memory store: a writer-preferring lock over the id->library map, and
/// one writer-preferring lock per library.
///
/// Per-library mutations resolve the library cell under a transient global
/// read lock and release it before taking the cell's write lock, so a
/// library writer never blocks the global map and vice versa.
#[derive(Default)]
pub struct MemoryStore {
    libraries: RwLock<HashMap<Uuid, LibraryCell>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, library_id: Uuid) -> Option<LibraryCell> {
        self.libraries.read().get(&library_id).cloned()
    }

    /// Run a mutation against one library under its write lock. The closure
    /// returns `Some` on success, in which case the library timestamp and
    /// version are updated inside the same critical section.
    fn mutate<R>(
        &self,
        library_id: Uuid,
        mutation: impl FnOnce(&mut Library) -> Option<R>,
    ) -> Result<Option<R>> {
        let Some(cell) = self.resolve(library_id) else {
            return Ok(None);
        };
        let mut library = cell.write();
        let result = mutation(&mut library);
        if result.is_some() {
            library.mark_updated();
        }
        Ok(result)
    }
}

impl Store for MemoryStore {
    fn create_library(&self, library: Library) -> Result<Library> {
        let mut libraries = self.libraries.write();
        debug!("create library {}", library.id);
        libraries.insert(library.id, Arc::new(RwLock::new(library.clone())));
        Ok(library)
    }

    fn get_library(&self, library_id: Uuid) -> Result<Option<Library>> {
        Ok(self.resolve(library_id).map(|cell| cell.read().clone()))
    }

    fn list_libraries(&self) -> Result<Vec<Library>> {
        let cells: Vec<LibraryCell> =
            self.libraries.read().values().cloned().collect();
        Ok(cells.iter().map(|cell| cell.read().clone()).collect())
    }

    fn update_library(
        &self,
        library_id: Uuid,
        patch: &LibraryPatch,
    ) -> Result<Option<Library>> {
        let Some(cell) = self.resolve(library_id) else {
            return Ok(None);
        };
        let mut library = cell.write();
        apply_library_patch(&mut library, patch);
        library.mark_updated();
        Ok(Some(library.clone()))
    }

    fn delete_library(&self, library_id: Uuid) -> Result<bool> {
        let removed = self.libraries.write().remove(&library_id).is_some();
        if removed {
            debug!("deleted library {library_id}");
        }
        Ok(removed)
    }

    fn library_version(&self, library_id: Uuid) -> Result<Option<u64>> {
        Ok(self.resolve(library_id).map(|cell| cell.read().version))
    }

    fn add_document(
        &self,
        library_id: Uuid,
        document: Document,
    ) -> Result<Option<Document>> {
        self.mutate(library_id, |library| {
            library.documents.push(document.clone());
            Some(document)
        })
    }

    fn get_document(
        &self,
        library_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Document>> {
        let Some(cell) = self.resolve(library_id) else {
            return Ok(None);
        };
        let library = cell.read();
        Ok(library
            .documents
            .iter()
            .find(|document| document.id == document_id)
            .cloned())
    }

    fn list_documents(&self, library_id: Uuid) -> Result<Option<Vec<Document>>> {
        let Some(cell) = self.resolve(library_id) else {
            return Ok(None);
        };
        Ok(Some(cell.read().documents.clone()))
    }

    fn update_document(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        patch: &DocumentPatch,
    ) -> Result<Option<Document>> {
        self.mutate(library_id, |library| {
            let document = library
                .documents
                .iter_mut()
                .find(|document| document.id == document_id)?;
            apply_document_patch(document, patch);
            document.metadata.touch();
            Some(document.clone())
        })
    }

    fn delete_document(&self, library_id: Uuid, document_id: Uuid) -> Result<bool> {
        let deleted = self.mutate(library_id, |library| {
            let before = library.documents.len();
            library.documents.retain(|document| document.id != document_id);
            if library.documents.len() != before {
                Some(())
            } else {
                None
            }
        })?;
        Ok(deleted.is_some())
    }

    fn add_chunk(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        chunk: Chunk,
    ) -> Result<Option<Chunk>> {
        self.mutate(library_id, |library| {
            let document = library
                .documents
                .iter_mut()
                .find(|document| document.id == document_id)?;
            document.chunks.push(chunk.clone());
            document.metadata.touch();
            Some(chunk)
        })
    }

    fn list_chunks(
        &self,
        library_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Vec<Chunk>>> {
        let Some(cell) = self.resolve(library_id) else {
            return Ok(None);
        };
        let library = cell.read();
        Ok(library
            .documents
            .iter()
            .find(|document| document.id == document_id)
            .map(|document| document.chunks.clone()))
    }

    fn update_chunk(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        chunk_id: Uuid,
        patch: &ChunkPatch,
    ) -> Result<Option<Chunk>> {
        self.mutate(library_id, |library| {
            let document = library
                .documents
                .iter_mut()
                .find(|document| document.id == document_id)?;
            let chunk = document
                .chunks
                .iter_mut()
                .find(|chunk| chunk.id == chunk_id)?;
            apply_chunk_patch(chunk, patch);
            chunk.metadata.touch();
            let updated = chunk.clone();
            document.metadata.touch();
            Some(updated)
        })
    }

    fn delete_chunk(
        &self,
        library_id: Uuid,
        document_id: Uuid,
        chunk_id: Uuid,
    ) -> Result<bool> {
        let deleted = self.mutate(library_id, |library| {
            let document = library
                .documents
                .iter_mut()
                .find(|document| document.id == document_id)?;
            let before = document.chunks.len();
            document.chunks.retain(|chunk| chunk.id != chunk_id);
            if document.chunks.len() != before {
                document.metadata.touch();
                Some(())
            } else {
                None
            }
        })?;
        Ok(deleted.is_some())
    }
}
