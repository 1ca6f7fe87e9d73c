//! The data store seam: schema lookup, counting and filtered fetches.
//!
//! The engine never mutates the store. [`MemoryStore`] is the in-process
//! implementation; anything else (a database, a CMS API) implements
//! [`DataStore`] the same way.

pub mod memory;

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::StoreError;
use crate::normalize::flatten_value;
use crate::request::PopulateSpec;
use crate::types::{CollectionSchema, Record};

pub use memory::MemoryStore;

/// A predicate pushed down to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every record.
    All,
    /// At least one sub-filter holds.
    Or(Vec<Filter>),
    /// Every sub-filter holds.
    And(Vec<Filter>),
    /// The flattened attribute contains `value`, ignoring case.
    ContainsInsensitive {
        /// Attribute name.
        field: String,
        /// Needle.
        value: String,
    },
    /// The attribute is present and not `null`.
    NotNull {
        /// Attribute name.
        field: String,
    },
}

impl Filter {
    /// Disjunction of case-insensitive containment over `fields`.
    pub fn contains_any<I, S>(fields: I, value: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(
            fields
                .into_iter()
                .map(|field| Self::ContainsInsensitive {
                    field: field.into(),
                    value: value.to_owned(),
                })
                .collect(),
        )
    }

    /// `self AND other`, dropping a redundant [`Filter::All`].
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All, f) | (f, Self::All) => f,
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Evaluate against an in-memory record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Or(filters) => filters.iter().any(|f| f.matches(record)),
            Self::And(filters) => filters.iter().all(|f| f.matches(record)),
            Self::ContainsInsensitive { field, value } => {
                flatten_value(field, record.get(field)).is_ok_and(|text| {
                    text.to_lowercase().contains(&value.to_lowercase())
                })
            }
            Self::NotNull { field } => record.get(field).is_some(),
        }
    }
}

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// Ordering criterion for [`DataStore::find_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Attribute to sort on.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl OrderBy {
    /// Largest `field` first.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Compare two records on this criterion. Records missing the attribute
    /// sort last in either direction.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match (a.get(&self.field), b.get(&self.field)) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                match self.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Options for [`DataStore::find_many`].
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    /// Which records qualify.
    pub filter: Filter,
    /// Stable ordering; store order when `None`.
    pub order_by: Option<OrderBy>,
    /// Maximum number of records; unbounded when `None`.
    pub limit: Option<usize>,
    /// Records to skip after ordering.
    pub offset: usize,
    /// Relations to join in.
    pub populate: PopulateSpec,
}

impl FindOptions {
    /// Every record matching `filter`, in store order, nothing populated.
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            order_by: None,
            limit: None,
            offset: 0,
            populate: PopulateSpec::default(),
        }
    }
}

/// A read-only record store.
///
/// All implementations must be `Send + Sync`: collections are queried
/// concurrently from one search.
pub trait DataStore: Send + Sync {
    /// Static schema of collection `uid`, if the store knows it.
    fn schema(&self, uid: &str) -> Option<CollectionSchema>;

    /// Number of records in `uid` matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or the collection
    /// does not exist.
    fn count(
        &self,
        uid: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Records of `uid` selected by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or the collection
    /// does not exist.
    fn find_many(
        &self,
        uid: &str,
        options: &FindOptions,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;
}

impl<T: DataStore> DataStore for &T {
    fn schema(&self, uid: &str) -> Option<CollectionSchema> {
        (**self).schema(uid)
    }

    fn count(
        &self,
        uid: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send {
        (**self).count(uid, filter)
    }

    fn find_many(
        &self,
        uid: &str,
        options: &FindOptions,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        (**self).find_many(uid, options)
    }
}

impl<T: DataStore> DataStore for Arc<T> {
    fn schema(&self, uid: &str) -> Option<CollectionSchema> {
        (**self).schema(uid)
    }

    fn count(
        &self,
        uid: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send {
        (**self).count(uid, filter)
    }

    fn find_many(
        &self,
        uid: &str,
        options: &FindOptions,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        (**self).find_many(uid, options)
    }
}
