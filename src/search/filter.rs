//! Exact-match metadata filtering over search rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::search::row::Row;

/// Narrows a row set to rows whose metadata contains every filter key with
/// an exactly equal value (logical AND across keys). An empty filter is the
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetadataFilter {
    #[serde(default)]
    pub equals: HashMap<String, String>,
}

impl MetadataFilter {
    pub fn matches(&self, row: &Row) -> bool {
        self.equals
            .iter()
            .all(|(key, value)| row.metadata.get(key) == Some(value))
    }

    pub fn apply(&self, rows: Vec<Row>) -> Vec<Row> {
        if self.equals.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

impl From<HashMap<String, String>> for MetadataFilter {
    fn from(equals: HashMap<String, String>) -> Self {
        Self { equals }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn row_with_metadata(pairs: &[(&str, &str)]) -> Row {
        Row {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            library_id: Uuid::new_v4(),
            text: String::new(),
            metadata: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            embedding: vec![1.0],
        }
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let rows = vec![row_with_metadata(&[]), row_with_metadata(&[("a", "1")])];
        let filter = MetadataFilter::default();
        assert_eq!(filter.apply(rows).len(), 2);
    }

    #[test]
    fn test_all_keys_must_match() {
        let rows = vec![
            row_with_metadata(&[("type", "landmark"), ("lang", "en")]),
            row_with_metadata(&[("type", "landmark")]),
            row_with_metadata(&[("type", "museum"), ("lang", "en")]),
        ];
        let filter = MetadataFilter::from(HashMap::from([
            ("type".to_string(), "landmark".to_string()),
            ("lang".to_string(), "en".to_string()),
        ]));
        assert_eq!(filter.apply(rows).len(), 1);
    }

    #[test]
    fn test_missing_key_excludes_row() {
        let rows = vec![row_with_metadata(&[("lang", "en")])];
        let filter = MetadataFilter::from(HashMap::from([(
            "type".to_string(),
            "landmark".to_string(),
        )]));
        assert!(filter.apply(rows).is_empty());
    }
}
