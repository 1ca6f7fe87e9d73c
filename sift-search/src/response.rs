//! Shaping stored records into response entries.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::request::PopulateSpec;
use crate::types::{CollectionSchema, Record, ResultEntry};

/// Attributes of `record` to return.
///
/// With `fields`, only the listed attributes the record has. Otherwise every
/// attribute declared by `schema`. Populated relations are added in both
/// cases.
pub fn select_attributes(
    record: &Record,
    schema: &CollectionSchema,
    fields: Option<&[String]>,
    populate: &PopulateSpec,
) -> Map<String, Value> {
    let mut selected = Map::new();
    let mut take = |name: &str| {
        if let Some(value) = record.attributes.get(name) {
            selected.insert(name.to_owned(), value.clone());
        }
    };
    match fields {
        Some(names) => names.iter().for_each(|name| take(name)),
        None => schema.attributes.keys().for_each(|name| take(name)),
    }
    populate.names().for_each(take);
    selected
}

/// Build a response entry.
pub fn entry(
    record: &Record,
    attributes: Map<String, Value>,
    score: Option<f64>,
    highlights: BTreeMap<String, String>,
) -> ResultEntry {
    ResultEntry {
        id: record.id.clone(),
        attributes,
        score,
        highlights,
    }
}
