//! End-to-end searches through the host: config file → dataset → response.

use serde_json::json;
use sift::AppConfig;
use sift_search::SearchRequest;
use tokio_util::sync::CancellationToken;

use crate::helpers::temp_fixture;

fn open_fixture() -> (tempfile::TempDir, sift_search::Searcher<sift_search::MemoryStore>) {
    let (dir, config_path) = temp_fixture();
    let config = AppConfig::from_file(&config_path).expect("load config");
    let data_path = config.data.path.clone().expect("data path");
    let searcher = sift::open(config, &data_path).expect("open");
    (dir, searcher)
}

#[tokio::test]
async fn typo_query_finds_published_article() {
    let (_dir, searcher) = open_fixture();
    let response = sift::run(&searcher, &SearchRequest::new("caat"), &CancellationToken::new())
        .await
        .expect("search");

    let articles = &response.results["article"];
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].id, "a1");
    assert_eq!(articles[0].highlights["title"], "<mark>cat</mark>");
    assert_eq!(articles[0].attributes["author"], json!({ "name": "Ana" }));
    assert_eq!(response.page_info["article"].total, 1);
}

#[tokio::test]
async fn transliterated_collection_matches_both_spellings() {
    let (_dir, searcher) = open_fixture();
    let response = sift::run(&searcher, &SearchRequest::new("cafe"), &CancellationToken::new())
        .await
        .expect("search");

    let ids: Vec<&str> = response.results["page"].iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"1"));
    assert!(ids.contains(&"2"));
    let cafe = response.results["page"]
        .iter()
        .find(|e| e.id == "1")
        .expect("café page");
    assert_eq!(cafe.highlights["title"], "<mark>Café</mark> opening hours");
}

#[tokio::test]
async fn cyrillic_title_found_by_latin_query() {
    let (_dir, searcher) = open_fixture();
    let response = sift::run(&searcher, &SearchRequest::new("moskva"), &CancellationToken::new())
        .await
        .expect("search");

    let pages = &response.results["page"];
    assert_eq!(pages[0].id, "3");
    assert_eq!(pages[0].highlights["title"], "<mark>Москва</mark> office");
}

#[tokio::test]
async fn fields_and_populate_shape_entries() {
    let (_dir, searcher) = open_fixture();
    let request = SearchRequest::new("cat").with_fields("title").with_populate("");
    let response = sift::run(&searcher, &request, &CancellationToken::new())
        .await
        .expect("search");

    let entry = &response.results["article"][0];
    assert_eq!(entry.attributes.keys().collect::<Vec<_>>(), vec!["title"]);
}

#[tokio::test]
async fn page_metadata_for_every_collection() {
    let (_dir, searcher) = open_fixture();
    let request = SearchRequest::new("cat").with_page(3);
    let response = sift::run(&searcher, &request, &CancellationToken::new())
        .await
        .expect("search");

    assert!(response.results["article"].is_empty());
    assert_eq!(response.page_info["article"].total, 1);
    assert_eq!(response.page_info["article"].page_count, 1);
    assert!(response.page_info.contains_key("page"));
}
