//! Search request parameters and the relation-population directive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Parameters of one search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query. Must not be empty.
    pub query: String,
    /// 1-based page number.
    pub page: usize,
    /// Entries per page.
    pub page_size: usize,
    /// Attributes to include in each entry. `None` means all schema attributes.
    pub fields: Option<Vec<String>>,
    /// Relations to populate. `None` means every populatable attribute.
    pub populate: Option<PopulateSpec>,
}

impl SearchRequest {
    /// A first-page request with the default page size.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            fields: None,
            populate: None,
        }
    }

    /// Set the 1-based page number.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restrict entries to the comma-separated attribute list `fields`.
    pub fn with_fields(mut self, fields: &str) -> Self {
        self.fields = Some(
            fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_owned)
                .collect(),
        );
        self
    }

    /// Populate relations according to `directive` (see [`PopulateSpec::parse`]).
    pub fn with_populate(mut self, directive: &str) -> Self {
        self.populate = Some(PopulateSpec::parse(directive));
        self
    }

    /// Reject requests that must not reach the store.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query must not be empty".into()));
        }
        if self.page == 0 {
            return Err(SearchError::InvalidQuery(
                "page must be a positive integer".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(SearchError::InvalidQuery(
                "page_size must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

/// Tree of relations to populate. An empty subtree populates the relation
/// itself without descending further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulateSpec {
    children: BTreeMap<String, PopulateSpec>,
}

impl PopulateSpec {
    /// Parse a directive such as `author,cover[image][formats]`.
    ///
    /// Each comma-separated part is a path; bracketed segments descend one
    /// level. Blank parts and segments are ignored.
    pub fn parse(directive: &str) -> Self {
        let mut root = Self::default();
        for part in directive.split(',') {
            let mut level = &mut root;
            let segments = part
                .split('[')
                .map(|s| s.trim_end_matches(']').trim())
                .filter(|s| !s.is_empty());
            for segment in segments {
                level = level.children.entry(segment.to_owned()).or_default();
            }
        }
        root
    }

    /// Populate each of `names` one level deep.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            children: names
                .into_iter()
                .map(|name| (name.into(), Self::default()))
                .collect(),
        }
    }

    /// Whether the top level names `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Subtree under `name`.
    pub fn get(&self, name: &str) -> Option<&PopulateSpec> {
        self.children.get(name)
    }

    /// Top-level relation names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Whether nothing is populated.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
