//! Content collections and the concurrent fan-out over them.

pub mod memory;
pub mod postgrest;

use crate::content::{BlogRecord, BrokerRecord, FaqRecord, PageRecord, SourceRecord, ToolRecord};
use anyhow::Result;
use metrics::{counter, histogram};
use std::future::Future;
use std::time::{Duration, Instant};

pub use memory::{Catalog, CatalogStore};
pub use postgrest::PostgrestStore;

/// Read-only lookups against the five site collections. Each call receives
/// the query tokens and returns rows matching any of them.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    async fn search_blog_posts(&self, terms: &[String]) -> Result<Vec<BlogRecord>>;
    async fn search_pages(&self, terms: &[String]) -> Result<Vec<PageRecord>>;
    async fn search_brokers(&self, terms: &[String]) -> Result<Vec<BrokerRecord>>;
    async fn search_tools(&self, terms: &[String]) -> Result<Vec<ToolRecord>>;
    async fn search_faqs(&self, terms: &[String]) -> Result<Vec<FaqRecord>>;
    fn name(&self) -> &'static str;
}

/// Row caps per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct CollectionLimits {
    pub blog_posts: usize,
    pub pages: usize,
    pub brokers: usize,
    pub tools: usize,
    pub faqs: usize,
}

impl Default for CollectionLimits {
    fn default() -> Self {
        Self {
            blog_posts: 5,
            pages: 5,
            brokers: 5,
            tools: 3,
            faqs: 3,
        }
    }
}

async fn settle<T, F>(source: &'static str, store: &'static str, fut: F) -> Vec<SourceRecord>
where
    F: Future<Output = Result<Vec<T>>>,
    T: Into<SourceRecord>,
{
    match fut.await {
        Ok(rows) => rows.into_iter().map(Into::into).collect(),
        Err(e) => {
            tracing::warn!(target: "assistant", error = ?e, source, store, "source query failed");
            counter!("assistant_source_errors_total", "source" => source).increment(1);
            Vec::new()
        }
    }
}

/// Query all five collections concurrently and wait for every one to settle.
///
/// A failing collection contributes no rows and is logged; the others still
/// count. If the whole fan-out exceeds `timeout`, nothing is returned.
/// Output order: blog, page, broker, tool, faq.
pub async fn fetch_all(
    store: &dyn ContentStore,
    terms: &[String],
    timeout: Duration,
) -> Vec<SourceRecord> {
    let t0 = Instant::now();
    let name = store.name();

    let fan_out = async {
        tokio::join!(
            settle("blog_posts", name, store.search_blog_posts(terms)),
            settle("pages", name, store.search_pages(terms)),
            settle("brokers", name, store.search_brokers(terms)),
            settle("tools", name, store.search_tools(terms)),
            settle("faqs", name, store.search_faqs(terms)),
        )
    };

    let out = match tokio::time::timeout(timeout, fan_out).await {
        Ok((blog, pages, brokers, tools, faqs)) => {
            let mut all = Vec::with_capacity(
                blog.len() + pages.len() + brokers.len() + tools.len() + faqs.len(),
            );
            all.extend(blog);
            all.extend(pages);
            all.extend(brokers);
            all.extend(tools);
            all.extend(faqs);
            all
        }
        Err(_) => {
            tracing::warn!(
                target: "assistant",
                store = name,
                timeout_ms = timeout.as_millis() as u64,
                "content fetch timed out"
            );
            counter!("assistant_fetch_timeouts_total").increment(1);
            Vec::new()
        }
    };

    histogram!("assistant_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    out
}

impl From<BlogRecord> for SourceRecord {
    fn from(r: BlogRecord) -> Self {
        SourceRecord::Blog(r)
    }
}

impl From<PageRecord> for SourceRecord {
    fn from(r: PageRecord) -> Self {
        SourceRecord::Page(r)
    }
}

impl From<BrokerRecord> for SourceRecord {
    fn from(r: BrokerRecord) -> Self {
        SourceRecord::Broker(r)
    }
}

impl From<ToolRecord> for SourceRecord {
    fn from(r: ToolRecord) -> Self {
        SourceRecord::Tool(r)
    }
}

impl From<FaqRecord> for SourceRecord {
    fn from(r: FaqRecord) -> Self {
        SourceRecord::Faq(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct HalfBroken;

    #[async_trait::async_trait]
    impl ContentStore for HalfBroken {
        async fn search_blog_posts(&self, _: &[String]) -> Result<Vec<BlogRecord>> {
            Err(anyhow!("blog table offline"))
        }
        async fn search_pages(&self, _: &[String]) -> Result<Vec<PageRecord>> {
            Ok(vec![PageRecord {
                id: "p1".into(),
                title: "Forex basics".into(),
                ..Default::default()
            }])
        }
        async fn search_brokers(&self, _: &[String]) -> Result<Vec<BrokerRecord>> {
            Err(anyhow!("permission denied"))
        }
        async fn search_tools(&self, _: &[String]) -> Result<Vec<ToolRecord>> {
            Ok(Vec::new())
        }
        async fn search_faqs(&self, _: &[String]) -> Result<Vec<FaqRecord>> {
            Ok(vec![FaqRecord {
                id: "f1".into(),
                question: "What is forex?".into(),
                ..Default::default()
            }])
        }
        fn name(&self) -> &'static str {
            "half-broken"
        }
    }

    struct Slow;

    #[async_trait::async_trait]
    impl ContentStore for Slow {
        async fn search_blog_posts(&self, _: &[String]) -> Result<Vec<BlogRecord>> {
            Ok(Vec::new())
        }
        async fn search_pages(&self, _: &[String]) -> Result<Vec<PageRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
        async fn search_brokers(&self, _: &[String]) -> Result<Vec<BrokerRecord>> {
            Ok(vec![BrokerRecord {
                id: "b".into(),
                name: "XM".into(),
                ..Default::default()
            }])
        }
        async fn search_tools(&self, _: &[String]) -> Result<Vec<ToolRecord>> {
            Ok(Vec::new())
        }
        async fn search_faqs(&self, _: &[String]) -> Result<Vec<FaqRecord>> {
            Ok(Vec::new())
        }
        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn failing_sources_are_isolated() {
        let out = fetch_all(&HalfBroken, &["forex".into()], Duration::from_secs(5)).await;
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], SourceRecord::Page(_)));
        assert!(matches!(out[1], SourceRecord::Faq(_)));
    }

    #[tokio::test]
    async fn timeout_drops_everything() {
        let out = fetch_all(&Slow, &["forex".into()], Duration::from_millis(50)).await;
        assert!(out.is_empty());
    }

    #[test]
    fn default_limits_match_collections() {
        let l = CollectionLimits::default();
        assert_eq!((l.blog_posts, l.pages, l.brokers, l.tools, l.faqs), (5, 5, 5, 3, 3));
    }
}
