//! Search orchestrator: concurrent per-collection retrieval, scoring, merge,
//! pagination and highlighting.
//!
//! This module fans a request out to every configured collection
//! concurrently, scores candidates in one or two passes, reconciles the
//! passes by record identifier, and cuts the ranked list into the
//! requested page.

pub mod highlight;
pub mod merge;
pub mod paginate;
pub mod scoring;
pub mod search;

pub use search::Searcher;
