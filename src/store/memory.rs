//! In-process catalog store.
//!
//! Holds the five collections loaded from a JSON export and answers lookups
//! with the same semantics as the hosted tables: case-insensitive substring
//! match of any term on the collection's searchable columns, collection
//! ordering, then the row cap.

use super::{CollectionLimits, ContentStore};
use crate::content::{BlogRecord, BrokerRecord, FaqRecord, PageRecord, ToolRecord};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub blog_posts: Vec<BlogRecord>,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
    #[serde(default)]
    pub brokers: Vec<BrokerRecord>,
    #[serde(default)]
    pub tools: Vec<ToolRecord>,
    #[serde(default)]
    pub faqs: Vec<FaqRecord>,
}

impl Catalog {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing content catalog json")
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading content catalog from {}", path.display()))?;
        Self::from_json_str(&data)
    }

    pub fn len(&self) -> usize {
        self.blog_posts.len() + self.pages.len() + self.brokers.len() + self.tools.len() + self.faqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct CatalogStore {
    catalog: Arc<Catalog>,
    limits: CollectionLimits,
}

impl CatalogStore {
    pub fn new(catalog: Catalog, limits: CollectionLimits) -> Self {
        Self {
            catalog: Arc::new(catalog),
            limits,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// `ilike '%term%'` on any column for any term.
fn ilike_any(columns: &[Option<&str>], terms: &[String]) -> bool {
    let lowered: Vec<String> = columns
        .iter()
        .flatten()
        .map(|c| c.to_lowercase())
        .collect();
    terms.iter().any(|t| {
        let t = t.to_lowercase();
        lowered.iter().any(|c| c.contains(&t))
    })
}

fn select<T: Clone>(
    rows: &[T],
    terms: &[String],
    limit: usize,
    columns: impl Fn(&T) -> Vec<Option<&str>>,
    order: Option<fn(&T, &T) -> Ordering>,
) -> Vec<T> {
    if terms.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<T> = rows
        .iter()
        .filter(|r| ilike_any(&columns(r), terms))
        .cloned()
        .collect();
    if let Some(cmp) = order {
        hits.sort_by(cmp);
    }
    hits.truncate(limit);
    hits
}

// Descending with missing keys last.
fn newest_blog_first(a: &BlogRecord, b: &BlogRecord) -> Ordering {
    b.published_at.cmp(&a.published_at)
}

fn newest_page_first(a: &PageRecord, b: &PageRecord) -> Ordering {
    b.last_updated.cmp(&a.last_updated)
}

fn best_rated_first(a: &BrokerRecord, b: &BrokerRecord) -> Ordering {
    let key = |r: &BrokerRecord| r.rating.filter(|x| !x.is_nan()).unwrap_or(f64::NEG_INFINITY);
    key(b).total_cmp(&key(a))
}

#[async_trait::async_trait]
impl ContentStore for CatalogStore {
    async fn search_blog_posts(&self, terms: &[String]) -> Result<Vec<BlogRecord>> {
        Ok(select(
            &self.catalog.blog_posts,
            terms,
            self.limits.blog_posts,
            |r| {
                vec![
                    Some(r.title.as_str()),
                    Some(r.content.as_str()),
                    r.excerpt.as_deref(),
                    r.tags.as_deref(),
                ]
            },
            Some(newest_blog_first),
        ))
    }

    async fn search_pages(&self, terms: &[String]) -> Result<Vec<PageRecord>> {
        Ok(select(
            &self.catalog.pages,
            terms,
            self.limits.pages,
            |r| {
                vec![
                    Some(r.title.as_str()),
                    Some(r.content.as_str()),
                    r.meta_description.as_deref(),
                ]
            },
            Some(newest_page_first),
        ))
    }

    async fn search_brokers(&self, terms: &[String]) -> Result<Vec<BrokerRecord>> {
        Ok(select(
            &self.catalog.brokers,
            terms,
            self.limits.brokers,
            |r| {
                vec![
                    Some(r.name.as_str()),
                    r.description.as_deref(),
                    r.country.as_deref(),
                    r.regulations.as_deref(),
                ]
            },
            Some(best_rated_first),
        ))
    }

    async fn search_tools(&self, terms: &[String]) -> Result<Vec<ToolRecord>> {
        Ok(select(
            &self.catalog.tools,
            terms,
            self.limits.tools,
            |r| {
                vec![
                    Some(r.name.as_str()),
                    r.description.as_deref(),
                    r.category.as_deref(),
                ]
            },
            None,
        ))
    }

    async fn search_faqs(&self, terms: &[String]) -> Result<Vec<FaqRecord>> {
        Ok(select(
            &self.catalog.faqs,
            terms,
            self.limits.faqs,
            |r| {
                vec![
                    Some(r.question.as_str()),
                    Some(r.answer.as_str()),
                    r.category.as_deref(),
                ]
            },
            None,
        ))
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "blog_posts": [
            {"id": 1, "url": "/blog/old", "title": "Leverage basics", "content": "", "published_at": "2023-01-01T00:00:00Z"},
            {"id": 2, "url": "/blog/new", "title": "Scalping", "content": "uses LEVERAGE", "published_at": "2024-06-01T00:00:00Z"},
            {"id": 3, "url": "/blog/undated", "title": "x", "content": "", "tags": "leverage"}
        ],
        "brokers": [
            {"id": "a", "name": "Low", "regulations": "FCA", "rating": 6.0},
            {"id": "b", "name": "Unrated", "regulations": "FCA"},
            {"id": "c", "name": "High", "regulations": "FCA, ASIC", "rating": 9.5}
        ],
        "tools": [
            {"id": "t1", "name": "Pip Calculator", "category": "calculators"},
            {"id": "t2", "name": "Margin Calculator", "category": "calculators"},
            {"id": "t3", "name": "Swap Calculator", "category": "calculators"},
            {"id": "t4", "name": "Position Size Calculator", "category": "calculators"}
        ]
    }"#;

    fn store() -> CatalogStore {
        CatalogStore::new(Catalog::from_json_str(CATALOG).unwrap(), CollectionLimits::default())
    }

    fn t(s: &str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[tokio::test]
    async fn blog_posts_newest_first_undated_last() {
        let rows = store().search_blog_posts(&t("leverage")).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[tokio::test]
    async fn brokers_by_rating_unrated_last() {
        let rows = store().search_brokers(&t("fca")).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn tools_capped_at_limit() {
        let rows = store().search_tools(&t("calculator")).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, "t1");
    }

    #[tokio::test]
    async fn empty_terms_or_no_match_yield_nothing() {
        let s = store();
        assert!(s.search_tools(&[]).await.unwrap().is_empty());
        assert!(s.search_faqs(&t("leverage")).await.unwrap().is_empty());
        assert!(s.search_pages(&t("leverage")).await.unwrap().is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Catalog::load_from_file("no/such/catalog.json").unwrap_err();
        assert!(format!("{err:#}").contains("no/such/catalog.json"));
    }
}
