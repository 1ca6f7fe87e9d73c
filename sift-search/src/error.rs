//! Error types for the sift-search crate.
//!
//! Request-level failures ([`SearchError`]) abort a search before any store
//! call is made. Collection-level failures ([`CollectionError`]) never leave
//! the aggregator: they are logged and the collection contributes an empty
//! page. Query text never appears in error messages.

/// Errors that abort a whole search request.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query string is empty, or a page parameter is out of range.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No collections are configured.
    #[error("no collections configured: {0}")]
    ConfigurationMissing(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The caller cancelled the request before all collections reported in.
    #[error("search cancelled")]
    Cancelled,
}

/// Why a single collection contributed no results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    /// The store was unreachable, timed out, or the schema is absent.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// None of the configured fields is searchable in the collection schema.
    #[error("scoring degenerate: {0}")]
    ScoringDegenerate(String),
}

/// Errors reported by a [`DataStore`](crate::store::DataStore) implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The store has no schema registered for the collection.
    #[error("schema missing for {0}")]
    SchemaMissing(String),

    /// The store answered with an error.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The round-trip exceeded the configured retrieval timeout.
    #[error("store timed out after {0}ms")]
    Timeout(u64),
}

impl From<StoreError> for CollectionError {
    fn from(err: StoreError) -> Self {
        Self::Retrieval(err.to_string())
    }
}

/// A record attribute could not be flattened into searchable text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// A rich-text node had an unexpected shape.
    #[error("malformed rich text in `{field}`: {reason}")]
    MalformedRichText {
        /// Attribute that held the malformed value.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Convenience type alias for sift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
