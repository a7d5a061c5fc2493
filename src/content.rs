//! Content records as stored in the five site collections, and the common
//! `ContentItem` shape the ranker works on.
//!
//! - Raw rows (`BlogRecord`, `PageRecord`, ...) mirror the hosted tables; every
//!   optional column defaults so partial rows still deserialize.
//! - `SourceRecord` tags a row with its collection.
//! - `normalize` maps any record into a `ContentItem` and never fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Closed set of content kinds. Order of `DISPLAY_ORDER` is the order
/// sections appear in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Page,
    Broker,
    Tool,
    Faq,
}

impl ContentType {
    pub const DISPLAY_ORDER: [ContentType; 5] = [
        ContentType::Blog,
        ContentType::Page,
        ContentType::Broker,
        ContentType::Tool,
        ContentType::Faq,
    ];

    /// Human-readable section heading.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Blog => "Blog Articles",
            ContentType::Page => "Website Pages",
            ContentType::Broker => "Forex Brokers",
            ContentType::Tool => "Trading Tools",
            ContentType::Faq => "Frequently Asked Questions",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Page => "page",
            ContentType::Broker => "broker",
            ContentType::Tool => "tool",
            ContentType::Faq => "faq",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ids arrive as UUID strings or integer keys depending on the table.
fn de_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }
    Ok(match RawId::deserialize(d)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

/// `null` and missing both become the type's default.
fn de_null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Tags are a comma list in some exports and a `text[]` column in others.
fn de_tags<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        Text(String),
        List(Vec<String>),
    }
    Ok(Option::<RawTags>::deserialize(d)?.map(|t| match t {
        RawTags::Text(s) => s,
        RawTags::List(v) => v.join(","),
    }))
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) or a bare
/// date. Anything else becomes `None` instead of rejecting the row.
fn de_timestamp<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(n.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub content: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub regulations: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub pros: Vec<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub question: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// A raw row tagged by the collection it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    Blog(BlogRecord),
    Page(PageRecord),
    Broker(BrokerRecord),
    Tool(ToolRecord),
    Faq(FaqRecord),
}

/// Normalized, per-request view of a record. `title` and `body` are always
/// set (possibly empty); type-specific fields default when not applicable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub excerpt: String,
    pub tags: String,
    pub description: String,
    pub category: String,
    pub rating: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl ContentItem {
    fn bare(kind: ContentType, id: String, url: String, title: String, body: String) -> Self {
        Self {
            id,
            url,
            title,
            body,
            kind,
            excerpt: String::new(),
            tags: String::new(),
            description: String::new(),
            category: String::new(),
            rating: 0.0,
            pros: Vec::new(),
            cons: Vec::new(),
        }
    }

    /// Fields searched by the ranker, in a fixed order.
    pub fn searchable_fields(&self) -> [&str; 6] {
        [
            self.title.as_str(),
            self.body.as_str(),
            self.excerpt.as_str(),
            self.tags.as_str(),
            self.description.as_str(),
            self.category.as_str(),
        ]
    }
}

/// Lowercase and replace each whitespace run with a single `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn normalize(record: SourceRecord) -> ContentItem {
    match record {
        SourceRecord::Blog(r) => {
            let mut item =
                ContentItem::bare(ContentType::Blog, r.id, r.url, r.title, r.content);
            item.excerpt = r.excerpt.unwrap_or_default();
            item.tags = r.tags.unwrap_or_default();
            item
        }
        SourceRecord::Page(r) => {
            let mut item =
                ContentItem::bare(ContentType::Page, r.id, r.url, r.title, r.content);
            item.description = r.meta_description.unwrap_or_default();
            item
        }
        SourceRecord::Broker(r) => {
            let url = non_empty(r.url).unwrap_or_else(|| format!("/brokers/{}", slugify(&r.name)));
            let mut item = ContentItem::bare(
                ContentType::Broker,
                r.id,
                url,
                r.name,
                r.description.unwrap_or_default(),
            );
            item.rating = r.rating.filter(|x| x.is_finite()).unwrap_or(0.0);
            item.pros = r.pros;
            item.cons = r.cons;
            item
        }
        SourceRecord::Tool(r) => {
            let url = non_empty(r.url).unwrap_or_else(|| format!("/tools/{}", slugify(&r.name)));
            let mut item = ContentItem::bare(
                ContentType::Tool,
                r.id,
                url,
                r.name,
                r.description.unwrap_or_default(),
            );
            item.category = r.category.unwrap_or_default();
            item
        }
        SourceRecord::Faq(r) => {
            let url = format!("/faq#{}", r.id);
            let mut item = ContentItem::bare(ContentType::Faq, r.id, url, r.question, r.answer);
            item.category = r.category.unwrap_or_default();
            item
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
