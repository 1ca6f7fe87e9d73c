//! Sift: fuzzy search across independently configured record collections.
//!
//! The host side of the `sift-search` engine. It loads a TOML
//! configuration and a JSON dataset, builds a [`Searcher`] over an
//! in-memory store, and runs searches on behalf of the `sift` binary.
//!
//! # Architecture
//!
//! - **Config**: `[search]` engine settings plus the `[data]` location
//! - **Dataset**: collections with a schema and their records
//! - **Engine**: retrieval, scoring, merge and pagination live in
//!   `sift-search`

pub mod config;
pub mod dataset;
pub mod error;

use std::path::Path;

use sift_search::{MemoryStore, SearchRequest, SearchResponse, Searcher};
use tokio_util::sync::CancellationToken;

pub use config::AppConfig;
pub use error::{AppError, Result};

/// Build a searcher over the dataset at `data_path`.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or the search
/// configuration is invalid for it.
pub fn open(config: AppConfig, data_path: &Path) -> Result<Searcher<MemoryStore>> {
    let store = dataset::load_dataset(data_path)?;
    let searcher = Searcher::new(store, config.search)?;
    let collections: Vec<&str> = searcher.collection_keys().collect();
    tracing::info!(?collections, "searcher ready");
    Ok(searcher)
}

/// Run one search, giving up when `token` is cancelled.
///
/// # Errors
///
/// Returns an error for an invalid request or on cancellation.
pub async fn run(
    searcher: &Searcher<MemoryStore>,
    request: &SearchRequest,
    token: &CancellationToken,
) -> Result<SearchResponse> {
    Ok(searcher.search_with_cancel(request, token).await?)
}
