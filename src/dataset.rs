//! JSON dataset loading into an in-memory store.
//!
//! ```json
//! {
//!   "collections": [
//!     {
//!       "uid": "api::article.article",
//!       "attributes": { "title": "string", "content": "blocks", "publishedAt": "datetime" },
//!       "records": [{ "id": 1, "title": "Cats", "publishedAt": "2024-01-01" }]
//!     }
//!   ]
//! }
//! ```
//!
//! Each record needs an `id` (or `documentId`), either a string or a number,
//! unique within its collection. Every other key becomes an attribute.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use sift_search::{AttributeKind, CollectionSchema, MemoryStore, Record};

use crate::error::{AppError, Result};

const ID_KEYS: [&str; 2] = ["id", "documentId"];

#[derive(Debug, Deserialize)]
struct DatasetFile {
    collections: Vec<DatasetCollection>,
}

#[derive(Debug, Deserialize)]
struct DatasetCollection {
    uid: String,
    attributes: BTreeMap<String, AttributeKind>,
    #[serde(default)]
    records: Vec<Map<String, Value>>,
}

/// Load a dataset file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a valid dataset, or
/// holds a record without a unique identifier.
pub fn load_dataset(path: &Path) -> Result<MemoryStore> {
    let content = std::fs::read_to_string(path)?;
    let store = parse_dataset(&content)?;
    tracing::debug!(path = %path.display(), "dataset loaded");
    Ok(store)
}

/// Parse a dataset from JSON text.
///
/// # Errors
///
/// Returns [`AppError::Dataset`] if the JSON is malformed, a record has no
/// usable identifier, or two records of a collection share one.
pub fn parse_dataset(json: &str) -> Result<MemoryStore> {
    let file: DatasetFile =
        serde_json::from_str(json).map_err(|e| AppError::Dataset(e.to_string()))?;

    let mut store = MemoryStore::new();
    for collection in file.collections {
        let records = collection
            .records
            .into_iter()
            .enumerate()
            .map(|(idx, attributes)| into_record(&collection.uid, idx, attributes))
            .collect::<Result<Vec<_>>>()?;
        let mut seen = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.id.as_str())) {
            return Err(AppError::Dataset(format!(
                "duplicate id `{}` in `{}`",
                dup.id, collection.uid
            )));
        }
        tracing::debug!(uid = %collection.uid, records = records.len(), "collection loaded");
        store.insert_collection(
            CollectionSchema::new(collection.uid, collection.attributes),
            records,
        );
    }
    Ok(store)
}

fn into_record(uid: &str, idx: usize, mut attributes: Map<String, Value>) -> Result<Record> {
    let id = ID_KEYS
        .iter()
        .find_map(|key| match attributes.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some((*key, s.clone())),
            Some(Value::Number(n)) => Some((*key, n.to_string())),
            _ => None,
        });
    let Some((key, id)) = id else {
        return Err(AppError::Dataset(format!("record {idx} of `{uid}` has no id")));
    };
    attributes.remove(key);
    Ok(Record::new(id, attributes))
}
