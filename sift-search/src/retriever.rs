//! Candidate retrieval, one implementation per [`RetrievalStrategy`].
//!
//! | strategy        | pushed filter         | limit          | scored in memory |
//! |-----------------|-----------------------|----------------|------------------|
//! | `pre-filtering` | containment ∧ publish | page size × 10 | no               |
//! |                 | from the page offset  |                |                  |
//! | `fuzzysort`     | publish only          | none           | yes              |
//! | `hybrid`        | containment ∧ publish | none           | yes              |
//!
//! Every store round-trip is bounded by the configured retrieval timeout.

use std::future::Future;
use std::time::Duration;

use crate::config::RetrievalStrategy;
use crate::error::StoreError;
use crate::request::PopulateSpec;
use crate::store::{DataStore, Filter, FindOptions, OrderBy};
use crate::types::{Record, PUBLISHED_AT};

/// Pre-filtering fetches at most this many pages of candidates.
pub const PRE_FILTER_PAGES: usize = 10;

/// Everything a retriever needs to know about one collection and request.
#[derive(Debug, Clone)]
pub struct RetrievalTarget<'a> {
    /// Schema uid.
    pub uid: &'a str,
    /// Raw query text, pushed down for containment filters.
    pub query: &'a str,
    /// Searchable attribute names.
    pub fields: Vec<&'a str>,
    /// Restrict to published records.
    pub published_only: bool,
    /// Stable ordering criterion.
    pub order_by: Option<OrderBy>,
    /// Relations to join in.
    pub populate: &'a PopulateSpec,
    /// Requested 1-based page.
    pub page: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Bound on each store round-trip.
    pub timeout: Duration,
}

impl RetrievalTarget<'_> {
    fn publication_filter(&self) -> Filter {
        if self.published_only {
            Filter::NotNull {
                field: PUBLISHED_AT.to_owned(),
            }
        } else {
            Filter::All
        }
    }

    fn containment_filter(&self) -> Filter {
        Filter::contains_any(self.fields.iter().copied(), self.query).and(self.publication_filter())
    }

    /// Store offset of the first record on the requested page.
    fn page_offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    fn find_options(&self, filter: Filter, limit: Option<usize>, offset: usize) -> FindOptions {
        FindOptions {
            filter,
            order_by: self.order_by.clone(),
            limit,
            offset,
            populate: self.populate.clone(),
        }
    }
}

/// What a retriever hands back to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// Candidates still to be scored and ranked in memory.
    Score(Vec<Record>),
    /// Final ranking as returned by the store, with the filtered count.
    Final {
        /// Records in store order, starting at the requested page.
        records: Vec<Record>,
        /// Count of records matching the pushed filter.
        total: usize,
    },
}

/// Fetches candidate records for one collection.
pub trait Retriever: Send + Sync {
    /// Run the retrieval against `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any store round-trip fails or times out.
    fn fetch<S: DataStore>(
        &self,
        store: &S,
        target: &RetrievalTarget<'_>,
    ) -> impl Future<Output = Result<Retrieval, StoreError>> + Send;

    /// Which strategy this retriever implements.
    fn strategy(&self) -> RetrievalStrategy;
}

/// Store-side containment filter, paged at the store, capped, unranked.
pub struct PreFilterRetriever;

/// Every published record, scored in memory.
pub struct InMemoryRetriever;

/// Store-side containment filter, uncapped, scored in memory.
pub struct HybridRetriever;

impl Retriever for PreFilterRetriever {
    async fn fetch<S: DataStore>(
        &self,
        store: &S,
        target: &RetrievalTarget<'_>,
    ) -> Result<Retrieval, StoreError> {
        let filter = target.containment_filter();
        let total = bounded(target.timeout, store.count(target.uid, &filter)).await?;
        let limit = target.page_size.saturating_mul(PRE_FILTER_PAGES);
        let options = target.find_options(filter, Some(limit), target.page_offset());
        let records = bounded(target.timeout, store.find_many(target.uid, &options)).await?;
        Ok(Retrieval::Final { records, total })
    }

    fn strategy(&self) -> RetrievalStrategy {
        RetrievalStrategy::PreFilter
    }
}

impl Retriever for InMemoryRetriever {
    async fn fetch<S: DataStore>(
        &self,
        store: &S,
        target: &RetrievalTarget<'_>,
    ) -> Result<Retrieval, StoreError> {
        let options = target.find_options(target.publication_filter(), None, 0);
        let records = bounded(target.timeout, store.find_many(target.uid, &options)).await?;
        Ok(Retrieval::Score(records))
    }

    fn strategy(&self) -> RetrievalStrategy {
        RetrievalStrategy::InMemory
    }
}

impl Retriever for HybridRetriever {
    async fn fetch<S: DataStore>(
        &self,
        store: &S,
        target: &RetrievalTarget<'_>,
    ) -> Result<Retrieval, StoreError> {
        let options = target.find_options(target.containment_filter(), None, 0);
        let records = bounded(target.timeout, store.find_many(target.uid, &options)).await?;
        Ok(Retrieval::Score(records))
    }

    fn strategy(&self) -> RetrievalStrategy {
        RetrievalStrategy::Hybrid
    }
}

/// Run the retriever for `strategy`.
pub async fn retrieve<S: DataStore>(
    strategy: RetrievalStrategy,
    store: &S,
    target: &RetrievalTarget<'_>,
) -> Result<Retrieval, StoreError> {
    tracing::trace!(uid = target.uid, %strategy, "retrieving candidates");
    match strategy {
        RetrievalStrategy::PreFilter => PreFilterRetriever.fetch(store, target).await,
        RetrievalStrategy::InMemory => InMemoryRetriever.fetch(store, target).await,
        RetrievalStrategy::Hybrid => HybridRetriever.fetch(store, target).await,
    }
}

async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| StoreError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)))?
}
