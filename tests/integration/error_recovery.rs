//! Startup and request failures surface as typed errors; per-collection
//! failures degrade instead.

use sift::{AppConfig, AppError};
use sift_search::{SearchError, SearchRequest};
use tokio_util::sync::CancellationToken;

use crate::helpers::{temp_fixture, temp_fixture_with, DATASET};

#[tokio::test]
async fn empty_query_is_invalid() {
    let (_dir, config_path) = temp_fixture();
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");
    let searcher = sift::open(config, &data_path).expect("open");

    let err = sift::run(&searcher, &SearchRequest::new(""), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Search(SearchError::InvalidQuery(_))));
}

#[test]
fn unknown_field_fails_at_startup() {
    let config = r#"
        [data]
        path = "records.json"

        [[search.collections]]
        uid = "api::article.article"
        fields = [{ name = "subtitle" }]
    "#;
    let (_dir, config_path) = temp_fixture_with(config, DATASET);
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");

    let err = sift::open(config, &data_path).unwrap_err();
    assert!(matches!(err, AppError::Search(SearchError::Config(_))));
    assert!(err.to_string().contains("subtitle"));
}

#[test]
fn no_collections_is_configuration_missing() {
    let (_dir, config_path) = temp_fixture_with("[data]\npath = \"records.json\"\n", DATASET);
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");

    let err = sift::open(config, &data_path).unwrap_err();
    assert!(matches!(err, AppError::Search(SearchError::ConfigurationMissing(_))));
}

#[tokio::test]
async fn collection_missing_from_dataset_degrades() {
    let config = r#"
        [data]
        path = "records.json"

        [[search.collections]]
        uid = "api::page.page"
        fields = [{ name = "title" }]

        [[search.collections]]
        uid = "api::event.event"
        fields = [{ name = "title" }]
    "#;
    let (_dir, config_path) = temp_fixture_with(config, DATASET);
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");
    let searcher = sift::open(config, &data_path).expect("open");

    let response = sift::run(&searcher, &SearchRequest::new("menu"), &CancellationToken::new())
        .await
        .expect("search");

    assert_eq!(response.results["page"].len(), 1);
    assert!(response.results["event"].is_empty());
    assert_eq!(response.page_info["event"].page_count, 0);
}

#[test]
fn malformed_dataset_is_dataset_error() {
    let (_dir, config_path) = temp_fixture_with(crate::helpers::CONFIG, "{ not json");
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");

    let err = sift::open(config, &data_path).unwrap_err();
    assert!(matches!(err, AppError::Dataset(_)));
}

#[tokio::test]
async fn cancelled_run_reports_cancellation() {
    let (_dir, config_path) = temp_fixture();
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");
    let searcher = sift::open(config, &data_path).expect("open");
    let token = CancellationToken::new();
    token.cancel();

    let err = sift::run(&searcher, &SearchRequest::new("cat"), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Search(SearchError::Cancelled)));
}
