//! Row projection: flattening a library's chunk tree into searchable rows.

use std::collections::HashMap;

use uuid::Uuid;

use crate::data::Library;

/// An ephemeral, read-only projection of one chunk and its parent ids.
///
/// Rows exist only inside the search path: rebuilt from current store state
/// on every search call, never persisted, never mutated.
#[derive(Debug, Clone)]
pub struct Row {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub library_id: Uuid,
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub embedding: Vec<f32>,
}

/// Flatten a library snapshot into rows, one per chunk with an embedding,
/// in document order then chunk order. Chunks without an embedding are
/// skipped; embedding generation may lag chunk creation and that is not an
/// error.
pub fn collect_rows(library: &Library) -> Vec<Row> {
    let mut rows = Vec::new();
    for document in &library.documents {
        for chunk in &document.chunks {
            let Some(embedding) = &chunk.embedding else {
                continue;
            };
            rows.push(Row {
                chunk_id: chunk.id,
                document_id: document.id,
                library_id: library.id,
                text: chunk.text.clone(),
                metadata: chunk.metadata.to_map(),
                embedding: embedding.clone(),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use crate::data::{Chunk, Document, Library};

    use super::*;

    #[test]
    fn test_collect_rows_skips_unembedded_chunks() {
        let mut library = Library::new("L");
        let mut document = Document::new("D");
        document
            .chunks
            .push(Chunk::new("embedded").with_embedding(vec![1.0, 0.0]));
        document.chunks.push(Chunk::new("pending"));
        library.documents.push(document);

        let rows = collect_rows(&library);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "embedded");
        assert_eq!(rows[0].library_id, library.id);
    }

    #[test]
    fn test_collect_rows_preserves_insertion_order() {
        let mut library = Library::new("L");
        for doc_index in 0..2 {
            let mut document = Document::new(format!("D{doc_index}"));
            for chunk_index in 0..2 {
                document.chunks.push(
                    Chunk::new(format!("{doc_index}-{chunk_index}"))
                        .with_embedding(vec![1.0]),
                );
            }
            library.documents.push(document);
        }

        let rows = collect_rows(&library);
        let texts: Vec<&str> = rows.iter().map(|row| row.text.as_str()).collect();
        assert_eq!(texts, vec!["0-0", "0-1", "1-0", "1-1"]);
    }
}
