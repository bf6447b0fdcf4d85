//! Key-value store backend.
//!
//! Libraries are serialized as JSON, one key per library. Every nested
//! mutation loads the whole library subtree, applies the change, and
//! rewrites the whole serialized subtree under the same key. That
//! whole-subtree rewrite is the contract of this backend: a chunk update in
//! a large library costs a full serialize of that library.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::data::{
    Chunk, ChunkPatch, Document, DocumentPatch, Library, LibraryPatch,
};
use crate::error::Result;
use crate::store::{
    Store, apply_chunk_patch, apply_document_patch, apply_library_patch,
};
use crate::sync::RwLock;

const KEY_PREFIX: &str = "biblio:library:";

/// Minimal contract for an external key-value backing store.
///
/// Network transport, retries, and persistence format belong to the
/// implementation behind this seam.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Process-local [`KvBackend`] used in tests and as a reference
/// implementation.
#[derive(Default)]
pub struct MemoryKvBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKvBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryKvBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Store backend over an external key-value store.
///
/// Locking mirrors [`MemoryStore`](crate::store::memory::MemoryStore): a
/// global lock for key enumeration, creation, and deletion, plus one
/// lazily-created lock per library for nested mutations. A nested mutation
/// holds the global lock for reading across its whole load-mutate-save
/// window, so a concurrent delete or create (global write) can never land
/// between the load and the save and be overwritten. The backend itself
/// only sees whole-subtree reads and writes.
pub struct KvStore {
    backend: Arc<dyn KvBackend>,
    global_lock: RwLock<()>,
    library_locks: Mutex<HashMap<Uuid, Arc<RwLock<()>>>>,
}

impl KvStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            global_lock: RwLock::new(()),
            library_locks: Mutex::new(HashMap::new()),
        }
    }

    fn key(library_id: Uuid) -> String {
        format!("{KEY_PREFIX}{library_id}")
    }

    fn library_lock(&self, library_id: Uuid) -> Arc<RwLock<()>> {
        self.library_locks
            .lock()
            .entry(library_id)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    fn load(&self, library_id: Uuid) -> Result<Option<Library>> {
        let Some(bytes) = self.backend.get(&Self::key(library_id))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, library: &Library) -> Result<()> {
        let bytes = serde_json::to_vec(library)?;
        self.backend.set(&Self::key(library.id), bytes)
    }

    /// Load-mutate-rewrite one library subtree.
    ///
    /// Holds the global lock for reading across the whole window (excluding
    /// create/delete, which write it) and the library's lock for writing
    /// (serializing same-library mutations). Mutations against different
    /// libraries still run in parallel under the shared global read lock.
    fn mutate<R>(
        &self,
        library_id: Uuid,
        mutation: impl FnOnce(&mut Library) -> Option<R>,
    ) -> Result<Option<R>> {
        let _global = self.global_lock.read();
        let lock = self.library_lock(library_id);
        let _guard = lock.write();
        let Some(mut library) = self.load(library_id)? else {
            // The key is absent and cannot appear while the global read
            // lock is held, so the registry entry guards nothing.
            self.library_locks.lock().remove(&library_id);
            return Ok(None);
        };
        let result = mutation(&mut library);
        if result.is_some() {
            library.mark_updated();
            self.save(&library)?;
        }
        Ok(result)
    }
}

impl Store for KvStore {
    fn create_library(&self, library: Library) -> Result<Library> {
        let _guard = self.global_lock.write();
        debug!("create library {}", library.id);
        self.save(&library)?;
        self.library_lock(library.id);
        Ok(library)
    }

    fn get_library(&self, library_id: Uuid) -> Result<Option<Library>> {
        let _guard = self.global_lock.read();
        self.load(library_id)
    }

    fn list_libraries(&self) -> Result<Vec<Library>> {
        let _guard = self.global_lock.read();
        let mut libraries = Vec::new();
        for key in self.backend.keys(KEY_PREFIX)? {
            if let Some(bytes) = self.backend.get(&key)? {
                libraries.push(serde_json::from_slice(&bytes)?);
            }
        }
        Ok(libraries)
    }

    fn update_library(
        &self,
        library_id: Uuid,
        patch: &LibraryPatch,
    ) -> Result<Option<Library>> {
        let _global = self.global_lock.read();
        let lock = self.library_lock(library_id);
        let _guard = lock.write();
        let Some(mut library) = self.load(library_id)? else {
            self.library_locks.lock().remove(&library_id);
            return Ok(None);
        };
        apply_library_patch(&mut library, patch);
        library.mark_updated();
        self.save(&library)?;
        Ok(Some(library))
    }

    fn delete_library(&self, library_id: Uuid) -> Result<bool> {
        let _guard = self.global_lock.write();
        let removed = self.backend.remove(&Self::key(library_id))?;
        self.library_locks.lock().remove(&library_id);
        if removed {
            debug!("deleted library {library_id}");
        }
        Ok(removed)
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
        let Some(library) = self.get_library(library_id)? else {
            return Ok(None);
        };
        Ok(library
            .documents
            .into_iter()
            .find(|document| document.id == document_id))
    }

    fn list_documents(&self, library_id: Uuid) -> Result<Option<Vec<Document>>> {
        Ok(self
            .get_library(library_id)?
            .map(|library| library.documents))
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
        let Some(library) = self.get_library(library_id)? else {
            return Ok(None);
        };
        Ok(library
            .documents
            .into_iter()
            .find(|document| document.id == document_id)
            .map(|document| document.chunks))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_library_mutations_do_not_leak_locks() {
        let store = KvStore::new(Arc::new(MemoryKvBackend::new()));
        for _ in 0..32 {
            store
                .add_document(Uuid::new_v4(), Document::new("D"))
                .unwrap();
        }
        store.delete_library(Uuid::new_v4()).unwrap();
        assert!(store.library_locks.lock().is_empty());
    }

    #[test]
    fn test_lock_registry_tracks_live_libraries() {
        let store = KvStore::new(Arc::new(MemoryKvBackend::new()));
        let library = store.create_library(Library::new("L")).unwrap();
        assert_eq!(store.library_locks.lock().len(), 1);

        store.delete_library(library.id).unwrap();
        assert!(store.library_locks.lock().is_empty());
    }
}
