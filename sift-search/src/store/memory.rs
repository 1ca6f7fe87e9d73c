//! In-process [`DataStore`] over owned records.
//!
//! Relation, component and media attributes are only returned when
//! populated, the way a relational store only joins what was asked for.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::types::{CollectionSchema, Record};

use super::{DataStore, Filter, FindOptions};

#[derive(Debug, Clone)]
struct StoredCollection {
    schema: CollectionSchema,
    records: Vec<Record>,
}

/// Immutable in-memory record store keyed by schema uid.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, StoredCollection>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a collection.
    pub fn insert_collection(&mut self, schema: CollectionSchema, records: Vec<Record>) {
        self.collections
            .insert(schema.uid.clone(), StoredCollection { schema, records });
    }

    /// Builder form of [`MemoryStore::insert_collection`].
    pub fn with_collection(mut self, schema: CollectionSchema, records: Vec<Record>) -> Self {
        self.insert_collection(schema, records);
        self
    }

    /// Number of records stored for `uid`.
    pub fn len(&self, uid: &str) -> usize {
        self.collections.get(uid).map_or(0, |c| c.records.len())
    }

    /// Whether the store holds no collections.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    fn collection(&self, uid: &str) -> Result<&StoredCollection, StoreError> {
        self.collections
            .get(uid)
            .ok_or_else(|| StoreError::SchemaMissing(uid.to_owned()))
    }
}

fn project(record: &Record, collection: &StoredCollection, options: &FindOptions) -> Record {
    let attributes = record
        .attributes
        .iter()
        .filter(|(name, _)| {
            collection
                .schema
                .kind(name)
                .map_or(true, |kind| {
                    !kind.is_populatable() || options.populate.contains(name)
                })
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    Record::new(record.id.clone(), attributes)
}

impl DataStore for MemoryStore {
    fn schema(&self, uid: &str) -> Option<CollectionSchema> {
        self.collections.get(uid).map(|c| c.schema.clone())
    }

    async fn count(&self, uid: &str, filter: &Filter) -> Result<usize, StoreError> {
        let collection = self.collection(uid)?;
        Ok(collection
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .count())
    }

    async fn find_many(&self, uid: &str, options: &FindOptions) -> Result<Vec<Record>, StoreError> {
        let collection = self.collection(uid)?;
        let mut matched: Vec<&Record> = collection
            .records
            .iter()
            .filter(|r| options.filter.matches(r))
            .collect();
        if let Some(order) = &options.order_by {
            matched.sort_by(|a, b| order.compare(a, b));
        }
        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(options.offset)
            .take(limit)
            .map(|r| project(r, collection, options))
            .collect())
    }
}
