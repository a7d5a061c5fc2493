//! Hosted content store behind a PostgREST (Supabase REST) endpoint.
//!
//! Each lookup is one `GET {base}/rest/v1/{table}` with an `or=(...)` filter of
//! `ilike` conditions, an order clause and a row limit. Non-2xx responses are
//! errors; `fetch_all` isolates them per collection.

use super::{CollectionLimits, ContentStore};
use crate::content::{BlogRecord, BrokerRecord, FaqRecord, PageRecord, ToolRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// One table query: columns to select, columns to match, order clause.
#[derive(Debug, Clone, Copy)]
pub struct TableQuery {
    pub table: &'static str,
    pub select: &'static str,
    pub search: &'static [&'static str],
    pub order: Option<&'static str>,
}

pub const BLOG_POSTS: TableQuery = TableQuery {
    table: "blog_posts",
    select: "id,url,title,content,excerpt,tags,published_at",
    search: &["title", "content", "excerpt", "tags"],
    order: Some("published_at.desc.nullslast"),
};

pub const PAGES: TableQuery = TableQuery {
    table: "pages",
    select: "id,url,title,content,meta_description,last_updated",
    search: &["title", "content", "meta_description"],
    order: Some("last_updated.desc.nullslast"),
};

pub const BROKERS: TableQuery = TableQuery {
    table: "brokers",
    // pros/cons are not columns of the hosted table; they stay empty
    select: "id,url,name,description,country,regulations,rating",
    search: &["name", "description", "country", "regulations"],
    order: Some("rating.desc.nullslast"),
};

pub const TOOLS: TableQuery = TableQuery {
    table: "tools",
    select: "id,url,name,description,category",
    search: &["name", "description", "category"],
    order: None,
};

pub const FAQS: TableQuery = TableQuery {
    table: "faqs",
    select: "id,question,answer,category",
    search: &["question", "answer", "category"],
    order: None,
};

/// Quote a term for use inside a PostgREST filter value. Reserved characters
/// (`,` `.` `:` `(` `)`) are safe inside double quotes; `"` and `\` are escaped.
fn quote_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 4);
    out.push_str("\"*");
    for ch in term.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        // `*` is the wildcard in URL filters
        if ch != '*' {
            out.push(ch);
        }
    }
    out.push_str("*\"");
    out
}

/// Build the `or` filter value: `(col.ilike."*term*",...)` for every
/// column/term pair, terms outermost.
pub fn or_filter(columns: &[&str], terms: &[String]) -> String {
    let conds: Vec<String> = terms
        .iter()
        .flat_map(|t| {
            let pat = quote_pattern(t);
            columns
                .iter()
                .map(move |c| format!("{c}.ilike.{pat}"))
        })
        .collect();
    format!("({})", conds.join(","))
}

/// Query-string pairs for one table lookup.
pub fn query_params(q: &TableQuery, terms: &[String], limit: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", q.select.to_string()),
        ("or", or_filter(q.search, terms)),
    ];
    if let Some(order) = q.order {
        params.push(("order", order.to_string()));
    }
    params.push(("limit", limit.to_string()));
    params
}

#[derive(Clone)]
pub struct PostgrestStore {
    base_url: String,
    api_key: String,
    limits: CollectionLimits,
    client: reqwest::Client,
}

impl PostgrestStore {
    pub fn new(
        base_url: &str,
        api_key: &str,
        limits: CollectionLimits,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("building postgrest http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            limits,
            client,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        q: &TableQuery,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<T>> {
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let resp = self
            .client
            .get(self.table_url(q.table))
            .query(&query_params(q, terms, limit))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("postgrest GET {}", q.table))?
            .error_for_status()
            .with_context(|| format!("postgrest status for {}", q.table))?;
        let rows = resp
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("decoding {} rows", q.table))?;
        tracing::debug!(target: "assistant", table = q.table, rows = rows.len(), "postgrest query");
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl ContentStore for PostgrestStore {
    async fn search_blog_posts(&self, terms: &[String]) -> Result<Vec<BlogRecord>> {
        self.query(&BLOG_POSTS, terms, self.limits.blog_posts).await
    }

    async fn search_pages(&self, terms: &[String]) -> Result<Vec<PageRecord>> {
        self.query(&PAGES, terms, self.limits.pages).await
    }

    async fn search_brokers(&self, terms: &[String]) -> Result<Vec<BrokerRecord>> {
        self.query(&BROKERS, terms, self.limits.brokers).await
    }

    async fn search_tools(&self, terms: &[String]) -> Result<Vec<ToolRecord>> {
        self.query(&TOOLS, terms, self.limits.tools).await
    }

    async fn search_faqs(&self, terms: &[String]) -> Result<Vec<FaqRecord>> {
        self.query(&FAQS, terms, self.limits.faqs).await
    }

    fn name(&self) -> &'static str {
        "postgrest"
    }
}
