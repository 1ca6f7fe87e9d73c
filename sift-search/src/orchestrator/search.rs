//! Core search orchestrator: concurrent per-collection fan-out, score, merge,
//! paginate, highlight.
//!
//! Every configured collection is searched concurrently. A collection that
//! fails contributes an empty page and zero-valued pagination metadata; it
//! never aborts its siblings.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{CollectionConfig, FieldSpec, HighlightConfig, RetrievalStrategy, SearchConfig};
use crate::error::{CollectionError, SearchError, StoreError};
use crate::matcher::PreparedQuery;
use crate::normalize::{normalize_record, transliterate, NormalizedRecord};
use crate::request::{PopulateSpec, SearchRequest};
use crate::response::{entry, select_attributes};
use crate::retriever::{retrieve, Retrieval, RetrievalTarget};
use crate::store::{DataStore, OrderBy};
use crate::types::{CollectionSchema, PageInfo, Record, ResultEntry, SearchResponse, CREATED_AT};

use super::highlight::render;
use super::merge::{merge, MergedResult};
use super::paginate::paginate;
use super::scoring::{score_original, score_transliterated, Pass, ScoredCandidate};

/// Everything resolved once against the store schema.
#[derive(Debug, Clone)]
struct CollectionPlan {
    schema: CollectionSchema,
    /// Configured fields whose kind is searchable, in configuration order.
    fields: Vec<FieldSpec>,
    published_only: bool,
    order_by: Option<OrderBy>,
}

#[derive(Debug, Clone)]
struct ResolvedCollection {
    key: String,
    config: CollectionConfig,
    plan: Result<CollectionPlan, CollectionError>,
}

/// One collection's contribution to the response.
#[derive(Debug)]
struct CollectionOutcome {
    entries: Vec<ResultEntry>,
    page_info: PageInfo,
}

/// Both forms of the query, prepared once per request.
struct Queries {
    original: PreparedQuery,
    transliterated: PreparedQuery,
}

/// Multi-collection search over a [`DataStore`].
///
/// Built once from a validated [`SearchConfig`]; read-only afterwards and
/// safe to share between concurrent requests.
#[derive(Debug)]
pub struct Searcher<S> {
    store: S,
    highlight: HighlightConfig,
    timeout: Duration,
    collections: Vec<ResolvedCollection>,
}

impl<S: DataStore> Searcher<S> {
    /// Validate `config` and resolve every collection against the store schema.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigurationMissing`] when no collection is
    /// configured, and [`SearchError::Config`] when the configuration is
    /// invalid or names an attribute the collection schema does not declare.
    /// A collection whose schema is missing, or that has no searchable
    /// field, is not an error here; it degrades at search time.
    pub fn new(store: S, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let collections = config
            .collections
            .into_iter()
            .map(|collection| {
                let plan = match store.schema(&collection.uid) {
                    Some(schema) => resolve(&collection, schema)?,
                    None => Err(StoreError::SchemaMissing(collection.uid.clone()).into()),
                };
                Ok(ResolvedCollection {
                    key: collection.key().to_owned(),
                    config: collection,
                    plan,
                })
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        tracing::debug!(collections = collections.len(), "searcher ready");
        Ok(Self {
            store,
            highlight: config.highlight,
            timeout: Duration::from_millis(config.retrieval_timeout_ms),
            collections,
        })
    }

    /// Response keys of the configured collections, in configuration order.
    pub fn collection_keys(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.key.as_str())
    }

    /// Search every configured collection.
    ///
    /// # Pipeline
    ///
    /// 1. Reject an invalid request before any store call
    /// 2. Fan out one retrieval per collection with [`futures::future::join_all`]
    /// 3. Score the original text and, if enabled, the transliterated composite
    /// 4. Merge both passes by record identifier and rank
    /// 5. Truncate to the collection `limit`, then paginate
    /// 6. Render highlights and shape entries for the requested page
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for an empty query or a zero
    /// page or page size. Per-collection failures are logged and never
    /// returned.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        request.validate()?;
        tracing::trace!(query = %request.query, page = request.page, "search");

        let queries = Queries {
            original: PreparedQuery::new(&request.query),
            transliterated: PreparedQuery::new(&transliterate(&request.query)),
        };
        let queries = &queries;

        let futures: Vec<_> = self
            .collections
            .iter()
            .map(|collection| async move {
                let outcome = self.search_collection(collection, request, queries).await;
                (collection, outcome)
            })
            .collect();

        let outcomes = futures::future::join_all(futures).await;

        let mut response = SearchResponse::default();
        for (collection, outcome) in outcomes {
            let outcome = match outcome {
                Ok(outcome) => {
                    tracing::debug!(
                        collection = %collection.key,
                        count = outcome.entries.len(),
                        total = outcome.page_info.total,
                        "collection searched"
                    );
                    outcome
                }
                Err(err) => {
                    tracing::warn!(
                        collection = %collection.key,
                        error = %err,
                        "collection search failed"
                    );
                    CollectionOutcome {
                        entries: Vec::new(),
                        page_info: PageInfo::empty(request.page, request.page_size),
                    }
                }
            };
            response.results.insert(collection.key.clone(), outcome.entries);
            response.page_info.insert(collection.key.clone(), outcome.page_info);
        }
        Ok(response)
    }

    /// Like [`Searcher::search`], abandoning every in-flight retrieval once
    /// `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `token` fires first, otherwise
    /// the same errors as [`Searcher::search`].
    pub async fn search_with_cancel(
        &self,
        request: &SearchRequest,
        token: &CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        tokio::select! {
            biased;
            () = token.cancelled() => Err(SearchError::Cancelled),
            response = self.search(request) => response,
        }
    }

    async fn search_collection(
        &self,
        collection: &ResolvedCollection,
        request: &SearchRequest,
        queries: &Queries,
    ) -> Result<CollectionOutcome, CollectionError> {
        let plan = collection.plan.as_ref().map_err(Clone::clone)?;
        let populate = request
            .populate
            .clone()
            .unwrap_or_else(|| PopulateSpec::from_names(plan.schema.populatable()));
        let target = RetrievalTarget {
            uid: &collection.config.uid,
            query: request.query.trim(),
            fields: plan.fields.iter().map(|f| f.name.as_str()).collect(),
            published_only: plan.published_only,
            order_by: plan.order_by.clone(),
            populate: &populate,
            page: request.page,
            page_size: request.page_size,
            timeout: self.timeout,
        };

        let shape = Shape {
            schema: &plan.schema,
            fields: request.fields.as_deref(),
            populate: &populate,
        };

        match retrieve(collection.config.strategy, &self.store, &target).await? {
            Retrieval::Final { records, total } => {
                // The store already paged: the requested page is the head.
                let entries = records
                    .iter()
                    .take(request.page_size)
                    .map(|record| {
                        let highlights = normalize_for(collection, plan, record)
                            .and_then(|normalized| {
                                let merged = score_passes(
                                    queries,
                                    record,
                                    0,
                                    &normalized,
                                    f64::NEG_INFINITY,
                                )?;
                                Some(self.highlights(&merged.candidate, &normalized))
                            })
                            .unwrap_or_default();
                        shape.entry(record, None, highlights)
                    })
                    .collect();
                Ok(CollectionOutcome {
                    entries,
                    page_info: PageInfo::new(total, request.page, request.page_size),
                })
            }
            Retrieval::Score(records) => {
                let threshold = collection.config.threshold;
                let mut original = Vec::new();
                let mut transliterated = Vec::new();
                let mut normalized: Vec<Option<NormalizedRecord>> =
                    Vec::with_capacity(records.len());
                for (position, record) in records.iter().enumerate() {
                    let Some(view) = normalize_for(collection, plan, record) else {
                        normalized.push(None);
                        continue;
                    };
                    let id = &record.id;
                    if let Some(c) =
                        score_original(&queries.original, id, position, &view, threshold)
                    {
                        original.push(c);
                    }
                    if let Some(c) = score_transliterated(
                        &queries.transliterated,
                        id,
                        position,
                        &view,
                        threshold,
                    ) {
                        transliterated.push(c);
                    }
                    normalized.push(Some(view));
                }

                let mut ranked = merge(original, transliterated);
                let transliterated_only = ranked
                    .iter()
                    .filter(|m| m.passes == [Pass::Transliterated])
                    .count();
                tracing::debug!(
                    collection = %collection.key,
                    candidates = records.len(),
                    matched = ranked.len(),
                    transliterated_only,
                    "collection scored"
                );
                if let Some(limit) = collection.config.limit {
                    ranked.truncate(limit);
                }

                let page = paginate(ranked, request.page, request.page_size);
                let entries = page
                    .items
                    .iter()
                    .filter_map(|merged| {
                        let candidate = &merged.candidate;
                        let record = records.get(candidate.position)?;
                        let view = normalized.get(candidate.position)?.as_ref()?;
                        let highlights = self.highlights(candidate, view);
                        Some(shape.entry(record, Some(candidate.score), highlights))
                    })
                    .collect();
                Ok(CollectionOutcome {
                    entries,
                    page_info: PageInfo::new(page.total, request.page, request.page_size),
                })
            }
        }
    }

    fn highlights(
        &self,
        candidate: &ScoredCandidate,
        record: &NormalizedRecord,
    ) -> BTreeMap<String, String> {
        candidate
            .matches
            .iter()
            .filter_map(|m| {
                let field = record.fields.get(m.field_index)?;
                let text = render(
                    &field.text,
                    &m.positions,
                    &self.highlight.open,
                    &self.highlight.close,
                );
                Some((field.name.clone(), text))
            })
            .collect()
    }
}

/// Per-request attribute selection.
struct Shape<'a> {
    schema: &'a CollectionSchema,
    fields: Option<&'a [String]>,
    populate: &'a PopulateSpec,
}

impl Shape<'_> {
    fn entry(
        &self,
        record: &Record,
        score: Option<f64>,
        highlights: BTreeMap<String, String>,
    ) -> ResultEntry {
        let attributes = select_attributes(record, self.schema, self.fields, self.populate);
        entry(record, attributes, score, highlights)
    }
}

/// Resolve `collection` against its store schema.
///
/// Unknown attributes are a configuration error. Attributes of a kind that
/// cannot be flattened to text are skipped.
fn resolve(
    collection: &CollectionConfig,
    schema: CollectionSchema,
) -> Result<Result<CollectionPlan, CollectionError>, SearchError> {
    let mut fields = Vec::with_capacity(collection.fields.len());
    for field in &collection.fields {
        match schema.kind(&field.name) {
            None => {
                return Err(SearchError::Config(format!(
                    "collection `{}` has no attribute `{}`",
                    collection.uid, field.name
                )));
            }
            Some(kind) if kind.is_searchable() => fields.push(field.clone()),
            Some(kind) => {
                tracing::warn!(
                    collection = %collection.key(),
                    field = %field.name,
                    %kind,
                    "field is not searchable, ignoring"
                );
            }
        }
    }

    if fields.is_empty() {
        return Ok(Err(CollectionError::ScoringDegenerate(format!(
            "no searchable field configured for `{}`",
            collection.uid
        ))));
    }

    let order_by = schema.has(CREATED_AT).then(|| OrderBy::desc(CREATED_AT));
    if collection.strategy == RetrievalStrategy::PreFilter && collection.limit.is_some() {
        tracing::debug!(collection = %collection.key(), "limit has no effect under pre-filtering");
    }
    Ok(Ok(CollectionPlan {
        published_only: schema.has_publication(),
        order_by,
        fields,
        schema,
    }))
}

fn normalize_for(
    collection: &ResolvedCollection,
    plan: &CollectionPlan,
    record: &Record,
) -> Option<NormalizedRecord> {
    match normalize_record(record, &plan.fields, collection.config.transliterate) {
        Ok(normalized) => Some(normalized),
        Err(err) => {
            tracing::debug!(
                collection = %collection.key,
                id = %record.id,
                error = %err,
                "skipping record"
            );
            None
        }
    }
}

/// Both passes for a single record, merged.
fn score_passes(
    queries: &Queries,
    record: &Record,
    position: usize,
    normalized: &NormalizedRecord,
    threshold: f64,
) -> Option<MergedResult> {
    let original = score_original(&queries.original, &record.id, position, normalized, threshold);
    let transliterated =
        score_transliterated(&queries.transliterated, &record.id, position, normalized, threshold);
    merge(
        original.into_iter().collect(),
        transliterated.into_iter().collect(),
    )
    .into_iter()
    .next()
}
