//! # sift-search
//!
//! Multi-collection fuzzy search aggregation.
//!
//! Given a free-text query and a set of independently configured record
//! collections, this crate retrieves candidates from a [`DataStore`], scores
//! them with a typo-tolerant fuzzy matcher, merges original-script and
//! transliterated matches, and returns one ranked, paginated, highlighted
//! page per collection.
//!
//! ## Design
//!
//! - Three retrieval strategies per collection: `pre-filtering`,
//!   `fuzzysort` and `hybrid`
//! - Rich-text attributes are flattened to plain text before matching
//! - Optional transliteration (diacritics, Cyrillic, Greek) for
//!   cross-alphabet matching
//! - Collections are searched concurrently; a failing collection degrades
//!   to an empty page and never aborts the others
//!
//! ## Privacy
//!
//! - Query text is logged only at trace level and never appears in errors
//! - The store is only ever read

pub mod config;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod retriever;
pub mod store;
pub mod types;

pub use config::{CollectionConfig, FieldSpec, HighlightConfig, RetrievalStrategy, SearchConfig};
pub use error::{CollectionError, NormalizeError, Result, SearchError, StoreError};
pub use orchestrator::Searcher;
pub use request::{PopulateSpec, SearchRequest};
pub use store::{DataStore, Filter, FindOptions, MemoryStore};
pub use types::{
    AttributeKind, CollectionSchema, PageInfo, Record, ResultEntry, SearchResponse,
};

/// Search every collection in `config`.
///
/// Convenience wrapper that builds a [`Searcher`] for a single request. The
/// request is validated first, so an invalid request never touches `store`.
///
/// # Errors
///
/// Returns [`SearchError::InvalidQuery`] for an empty query,
/// [`SearchError::ConfigurationMissing`] when no collection is configured,
/// or [`SearchError::Config`] for an invalid configuration.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> sift_search::Result<()> {
/// use sift_search::{CollectionConfig, FieldSpec, MemoryStore, SearchConfig, SearchRequest};
///
/// let store = MemoryStore::new();
/// let config = SearchConfig::with_collections(vec![CollectionConfig::new(
///     "api::article.article",
///     vec![FieldSpec::new("title")],
/// )]);
/// let response = sift_search::search(&store, config, &SearchRequest::new("rust")).await?;
/// for (collection, entries) in &response.results {
///     println!("{collection}: {} hits", entries.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search<S: DataStore>(
    store: S,
    config: SearchConfig,
    request: &SearchRequest,
) -> Result<SearchResponse> {
    request.validate()?;
    Searcher::new(store, config)?.search(request).await
}
