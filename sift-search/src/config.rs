//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] lists the collections to search, how each one is
//! retrieved and scored, and how matches are highlighted. It is loaded once
//! and is read-only for every search that uses it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Default score below which candidates are discarded (permissive).
pub const DEFAULT_THRESHOLD: f64 = -10_000.0;

/// Configuration for the whole aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Collections to search, in configuration order.
    pub collections: Vec<CollectionConfig>,
    /// Markers wrapped around matched character runs.
    pub highlight: HighlightConfig,
    /// Upper bound for a single store round-trip, in milliseconds.
    pub retrieval_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collections: Vec::new(),
            highlight: HighlightConfig::default(),
            retrieval_timeout_ms: 5_000,
        }
    }
}

/// How candidates are fetched from the store for one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetrievalStrategy {
    /// Push a containment filter to the store and return its rows unranked.
    #[serde(rename = "pre-filtering")]
    PreFilter,
    /// Fetch every eligible record and score all of them in memory.
    #[serde(rename = "fuzzysort")]
    InMemory,
    /// Push the containment filter, then fully score the filtered rows.
    #[default]
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl RetrievalStrategy {
    /// Configuration name of this strategy.
    pub fn name(self) -> &'static str {
        match self {
            Self::PreFilter => "pre-filtering",
            Self::InMemory => "fuzzysort",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One searchable field of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Attribute name in the collection schema.
    pub name: String,
    /// Added to the field's raw match score. May be negative.
    #[serde(default)]
    pub weight: f64,
    /// Only the first `character_limit` characters are searched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_limit: Option<usize>,
}

impl FieldSpec {
    /// A field with weight 0 and no truncation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 0.0,
            character_limit: None,
        }
    }

    /// Set the additive weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the character-limit truncation.
    pub fn with_character_limit(mut self, limit: usize) -> Self {
        self.character_limit = Some(limit);
        self
    }
}

/// Configuration of one searchable collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Namespaced schema identifier, e.g. `api::article.article`.
    pub uid: String,
    /// Weighted fields to score against the query.
    pub fields: Vec<FieldSpec>,
    /// Also score a transliterated composite of all fields.
    pub transliterate: bool,
    /// Candidates scoring below this are excluded.
    pub threshold: f64,
    /// Maximum number of ranked results kept before pagination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Retrieval strategy.
    pub strategy: RetrievalStrategy,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            uid: String::new(),
            fields: Vec::new(),
            transliterate: false,
            threshold: DEFAULT_THRESHOLD,
            limit: None,
            strategy: RetrievalStrategy::default(),
        }
    }
}

impl CollectionConfig {
    /// A hybrid, non-transliterating collection with the default threshold.
    pub fn new(uid: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            uid: uid.into(),
            fields,
            ..Default::default()
        }
    }

    /// Set the retrieval strategy.
    pub fn with_strategy(mut self, strategy: RetrievalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable the transliterated scoring pass.
    pub fn with_transliteration(mut self, enabled: bool) -> Self {
        self.transliterate = enabled;
        self
    }

    /// Set the score threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Cap the number of ranked results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Short key used in the response maps.
    pub fn key(&self) -> &str {
        collection_key(&self.uid)
    }
}

/// Markers wrapped around each matched run of characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Opening marker.
    pub open: String,
    /// Closing marker.
    pub close: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            open: "<mark>".into(),
            close: "</mark>".into(),
        }
    }
}

/// Derive the response key from a namespaced schema identifier.
///
/// `api::article.article` → `article`. Identifiers without a namespace or a
/// dotted suffix are used as far as they go.
pub fn collection_key(uid: &str) -> &str {
    let local = uid.split_once("::").map_or(uid, |(_, rest)| rest);
    local.split_once('.').map_or(local, |(head, _)| head)
}

impl SearchConfig {
    /// A configuration with the given collections and default settings.
    pub fn with_collections(collections: Vec<CollectionConfig>) -> Self {
        Self {
            collections,
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - at least one collection is configured
    /// - every collection has a non-empty `uid`
    /// - derived collection keys are unique
    /// - thresholds and weights are finite
    /// - `character_limit` and `limit`, when set, are greater than 0
    /// - `retrieval_timeout_ms` is greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.collections.is_empty() {
            return Err(SearchError::ConfigurationMissing(
                "at least one collection must be configured".into(),
            ));
        }
        if self.retrieval_timeout_ms == 0 {
            return Err(SearchError::Config(
                "retrieval_timeout_ms must be greater than 0".into(),
            ));
        }

        let mut keys = HashSet::new();
        for collection in &self.collections {
            if collection.uid.trim().is_empty() {
                return Err(SearchError::Config("collection uid must not be empty".into()));
            }
            let key = collection.key();
            if key.is_empty() {
                return Err(SearchError::Config(format!(
                    "collection `{}` derives an empty key",
                    collection.uid
                )));
            }
            if !keys.insert(key) {
                return Err(SearchError::Config(format!(
                    "collection `{}` derives key `{key}` already used by another collection",
                    collection.uid
                )));
            }
            if !collection.threshold.is_finite() {
                return Err(SearchError::Config(format!(
                    "threshold of `{}` must be finite",
                    collection.uid
                )));
            }
            if collection.limit == Some(0) {
                return Err(SearchError::Config(format!(
                    "limit of `{}` must be greater than 0",
                    collection.uid
                )));
            }
            for field in &collection.fields {
                if !field.weight.is_finite() {
                    return Err(SearchError::Config(format!(
                        "weight of `{}.{}` must be finite",
                        collection.uid, field.name
                    )));
                }
                if field.character_limit == Some(0) {
                    return Err(SearchError::Config(format!(
                        "character_limit of `{}.{}` must be greater than 0",
                        collection.uid, field.name
                    )));
                }
            }
        }
        Ok(())
    }
}
