//! Shared helpers for integration tests.

use std::path::PathBuf;

/// Dataset with an `article` collection (draft/publish, rich text, author
/// relation) and a `page` collection.
pub(crate) const DATASET: &str = r#"{
  "collections": [
    {
      "uid": "api::article.article",
      "attributes": {
        "title": "string",
        "content": "blocks",
        "author": "relation",
        "publishedAt": "datetime",
        "createdAt": "datetime"
      },
      "records": [
        {
          "id": "a1",
          "title": "cat",
          "content": [{
            "type": "paragraph",
            "children": [{ "type": "text", "text": "A short note" }]
          }],
          "author": { "name": "Ana" },
          "publishedAt": "2024-01-02",
          "createdAt": "2024-01-01"
        },
        {
          "id": "a2",
          "title": "dog",
          "content": [],
          "publishedAt": "2024-02-02",
          "createdAt": "2024-02-01"
        },
        {
          "id": "a3",
          "title": "cat draft",
          "publishedAt": null,
          "createdAt": "2024-03-01"
        }
      ]
    },
    {
      "uid": "api::page.page",
      "attributes": { "title": "string", "slug": "uid" },
      "records": [
        { "id": 1, "title": "Café opening hours", "slug": "cafe-hours" },
        { "id": 2, "title": "Cafe menu", "slug": "cafe-menu" },
        { "id": 3, "title": "Москва office", "slug": "moscow" }
      ]
    }
  ]
}"#;

/// Engine configuration matching [`DATASET`].
pub(crate) const CONFIG: &str = r#"
[data]
path = "records.json"

[search]
retrieval_timeout_ms = 2000

[[search.collections]]
uid = "api::article.article"
strategy = "fuzzysort"
fields = [{ name = "title" }, { name = "content", weight = -50 }]

[[search.collections]]
uid = "api::page.page"
strategy = "fuzzysort"
transliterate = true
fields = [{ name = "title", character_limit = 40 }, { name = "slug", weight = -10 }]
"#;

/// Write [`CONFIG`] and [`DATASET`] into a fresh temp dir.
/// Returns `(tempdir, config_path)`.
pub(crate) fn temp_fixture() -> (tempfile::TempDir, PathBuf) {
    temp_fixture_with(CONFIG, DATASET)
}

/// Write `config` and `dataset` into a fresh temp dir.
/// Returns `(tempdir, config_path)`.
pub(crate) fn temp_fixture_with(config: &str, dataset: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, config).expect("write config");
    std::fs::write(dir.path().join("records.json"), dataset).expect("write dataset");
    (dir, config_path)
}
