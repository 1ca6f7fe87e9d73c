//! Core types: records, schemas, result entries and pagination metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute holding the publication timestamp in draft/publish schemas.
pub const PUBLISHED_AT: &str = "publishedAt";

/// Attribute used as the stable "most recent first" ordering criterion.
pub const CREATED_AT: &str = "createdAt";

/// A stored record: a stable identifier plus arbitrary named attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique within the record's collection.
    pub id: String,
    /// Scalar and nested attributes (rich text, relations, media).
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Create a record from an identifier and an attribute map.
    pub fn new(id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Look up an attribute, treating JSON `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }
}

/// Declared type of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Short plain string.
    String,
    /// Long plain text.
    Text,
    /// Structured rich-text blocks.
    #[serde(alias = "blocks")]
    RichText,
    /// E-mail address.
    Email,
    /// Slug-like unique string.
    Uid,
    /// Integer or decimal number.
    Number,
    /// Boolean flag.
    Boolean,
    /// Date or timestamp.
    DateTime,
    /// Free-form JSON.
    Json,
    /// Link to records of another collection.
    Relation,
    /// Embedded reusable component.
    Component,
    /// Uploaded media reference.
    Media,
}

impl AttributeKind {
    /// Whether values of this kind can be flattened into searchable text.
    pub fn is_searchable(self) -> bool {
        matches!(
            self,
            Self::String | Self::Text | Self::RichText | Self::Email | Self::Uid
        )
    }

    /// Whether values of this kind are joined in only when populated.
    pub fn is_populatable(self) -> bool {
        matches!(self, Self::Relation | Self::Component | Self::Media)
    }
}

/// Static description of a collection's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Namespaced schema identifier, e.g. `api::article.article`.
    pub uid: String,
    /// Attribute name → declared kind.
    pub attributes: BTreeMap<String, AttributeKind>,
}

impl CollectionSchema {
    /// Create a schema from `(name, kind)` pairs.
    pub fn new<I, K>(uid: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeKind)>,
        K: Into<String>,
    {
        Self {
            uid: uid.into(),
            attributes: attributes
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }

    /// Returns the declared kind of `name`, if the schema has it.
    pub fn kind(&self, name: &str) -> Option<AttributeKind> {
        self.attributes.get(name).copied()
    }

    /// Whether the schema declares `name`.
    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Whether records of this collection carry a draft/publish state.
    pub fn has_publication(&self) -> bool {
        self.has(PUBLISHED_AT)
    }

    /// Names of all relation, component and media attributes.
    pub fn populatable(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, kind)| kind.is_populatable())
            .map(|(name, _)| name.as_str())
    }
}

/// Pagination metadata for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Requested page (1-based).
    pub page: usize,
    /// Requested page size.
    pub page_size: usize,
    /// `ceil(total / page_size)`; zero exactly when `total` is zero.
    pub page_count: usize,
    /// Number of ranked matches across all pages.
    pub total: usize,
}

impl PageInfo {
    /// Compute pagination metadata for `total` matches.
    pub fn new(total: usize, page: usize, page_size: usize) -> Self {
        let page_count = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            page,
            page_size,
            page_count,
            total,
        }
    }

    /// Zero-valued metadata for a collection that failed or matched nothing.
    pub fn empty(page: usize, page_size: usize) -> Self {
        Self::new(0, page, page_size)
    }
}

/// One entry on a collection's result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Record identifier.
    pub id: String,
    /// Selected attributes plus populated relations.
    pub attributes: Map<String, Value>,
    /// Aggregate fuzzy score. Absent under pure pre-filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Field name → text with matched runs wrapped in highlight markers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub highlights: BTreeMap<String, String>,
}

/// Per-collection result pages and pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Collection key → ranked entries on the requested page.
    pub results: BTreeMap<String, Vec<ResultEntry>>,
    /// Collection key → pagination metadata.
    #[serde(rename = "pageInfo")]
    pub page_info: BTreeMap<String, PageInfo>,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Text => "text",
            Self::RichText => "richtext",
            Self::Email => "email",
            Self::Uid => "uid",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Json => "json",
            Self::Relation => "relation",
            Self::Component => "component",
            Self::Media => "media",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_count_is_ceiling_of_total() {
        assert_eq!(PageInfo::new(0, 1, 10).page_count, 0);
        assert_eq!(PageInfo::new(1, 1, 10).page_count, 1);
        assert_eq!(PageInfo::new(10, 1, 10).page_count, 1);
        assert_eq!(PageInfo::new(11, 1, 10).page_count, 2);
        assert_eq!(PageInfo::new(5, 3, 10).page_count, 1);
    }

    #[test]
    fn page_count_zero_iff_total_zero() {
        for total in 0..50 {
            for page_size in 1..12 {
                let info = PageInfo::new(total, 1, page_size);
                assert_eq!(info.page_count == 0, total == 0);
            }
        }
    }

    #[test]
    fn empty_page_info_keeps_request_shape() {
        let info = PageInfo::empty(2, 25);
        assert_eq!(info.page, 2);
        assert_eq!(info.page_size, 25);
        assert_eq!(info.total, 0);
        assert_eq!(info.page_count, 0);
    }

    #[test]
    fn page_info_serializes_camel_case() {
        let json = serde_json::to_value(PageInfo::new(21, 1, 10)).expect("serialize");
        assert_eq!(
            json,
            json!({ "page": 1, "pageSize": 10, "pageCount": 3, "total": 21 })
        );
    }

    #[test]
    fn record_get_treats_null_as_absent() {
        let mut attrs = Map::new();
        attrs.insert("title".into(), json!("Hello"));
        attrs.insert("subtitle".into(), Value::Null);
        let record = Record::new("1", attrs);
        assert_eq!(record.get("title"), Some(&json!("Hello")));
        assert!(record.get("subtitle").is_none());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn attribute_kind_accepts_blocks_alias() {
        let kind: AttributeKind = serde_json::from_str("\"blocks\"").expect("deserialize");
        assert_eq!(kind, AttributeKind::RichText);
        assert_eq!(kind.to_string(), "richtext");
    }

    #[test]
    fn searchable_and_populatable_kinds_are_disjoint() {
        let all = [
            AttributeKind::String,
            AttributeKind::Text,
            AttributeKind::RichText,
            AttributeKind::Email,
            AttributeKind::Uid,
            AttributeKind::Number,
            AttributeKind::Boolean,
            AttributeKind::DateTime,
            AttributeKind::Json,
            AttributeKind::Relation,
            AttributeKind::Component,
            AttributeKind::Media,
        ];
        for kind in all {
            assert!(!(kind.is_searchable() && kind.is_populatable()), "{kind}");
        }
    }

    #[test]
    fn schema_reports_publication_and_populatable() {
        let schema = CollectionSchema::new(
            "api::article.article",
            [
                ("title", AttributeKind::String),
                ("author", AttributeKind::Relation),
                ("cover", AttributeKind::Media),
                (PUBLISHED_AT, AttributeKind::DateTime),
            ],
        );
        assert!(schema.has_publication());
        let populatable: Vec<&str> = schema.populatable().collect();
        assert_eq!(populatable, vec!["author", "cover"]);
    }

    #[test]
    fn result_entry_omits_empty_optionals() {
        let entry = ResultEntry {
            id: "a1".into(),
            attributes: Map::new(),
            score: None,
            highlights: BTreeMap::new(),
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json, json!({ "id": "a1", "attributes": {} }));
    }
}
