// src/search/mod.rs
//! Chat answer pipeline:
//! tokenize -> fetch (5 collections) -> normalize -> rank -> format.

pub mod format;
pub mod intent;
pub mod rank;
pub mod site_index;
pub mod tokenize;

use crate::config::SearchSettings;
use crate::content::{normalize, ContentItem};
use crate::store::{fetch_all, ContentStore};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub use format::{
    format_reply, APOLOGY_RESPONSE, INVALID_REQUEST_ERROR, NO_RESULTS_RESPONSE,
    SHORT_QUERY_RESPONSE,
};
pub use rank::{rank, score, Relevance};
pub use site_index::{SiteHit, SiteIndex};
pub use tokenize::tokenize;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("assistant_requests_total", "Chat messages answered.");
        describe_counter!(
            "assistant_short_queries_total",
            "Messages with no usable search token."
        );
        describe_counter!(
            "assistant_source_errors_total",
            "Failed collection lookups, by source."
        );
        describe_counter!(
            "assistant_fetch_timeouts_total",
            "Fan-outs abandoned after the fetch timeout."
        );
        describe_counter!(
            "assistant_invalid_requests_total",
            "Requests rejected for a missing or non-string message."
        );
        describe_histogram!("assistant_fetch_ms", "Content fan-out time in milliseconds.");
        describe_gauge!(
            "assistant_last_results",
            "Ranked items included in the most recent reply."
        );
    });
}

/// Short, non-reversible id for log lines; raw messages are never logged.
pub fn anon_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}

/// A single chat turn to answer.
#[derive(Debug, Clone, Default)]
pub struct ChatQuery {
    pub message: String,
    /// Also look the message up in the static site page index.
    pub search_web: bool,
}

impl ChatQuery {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            search_web: false,
        }
    }
}

/// Everything needed to answer a message. Cheap to clone.
#[derive(Clone)]
pub struct Assistant {
    store: Arc<dyn ContentStore>,
    site_index: Arc<SiteIndex>,
    settings: SearchSettings,
}

impl Assistant {
    pub fn new(store: Arc<dyn ContentStore>, site_index: SiteIndex, settings: SearchSettings) -> Self {
        ensure_metrics_described();
        Self {
            store,
            site_index: Arc::new(site_index),
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Fetch, normalize and rank content for the given tokens.
    pub async fn ranked(&self, tokens: &[String]) -> Vec<ContentItem> {
        let records =
            fetch_all(self.store.as_ref(), tokens, self.settings.fetch_timeout()).await;
        let items: Vec<ContentItem> = records.into_iter().map(normalize).collect();
        rank(items, tokens, self.settings.top_k)
    }

    /// Answer one message. Never fails: store problems degrade to fewer (or
    /// no) results.
    pub async fn reply(&self, query: &ChatQuery) -> String {
        counter!("assistant_requests_total").increment(1);
        let id = anon_id(&query.message);

        let tokens = tokenize(&query.message);
        if tokens.is_empty() {
            counter!("assistant_short_queries_total").increment(1);
            tracing::debug!(target: "assistant", %id, "no usable tokens");
            return SHORT_QUERY_RESPONSE.to_string();
        }

        let top = self.ranked(&tokens).await;
        let web = if query.search_web {
            self.site_index.lookup(&tokens)
        } else {
            Vec::new()
        };
        gauge!("assistant_last_results").set(top.len() as f64);

        tracing::info!(
            target: "assistant",
            %id,
            tokens = tokens.len(),
            results = top.len(),
            site_hits = web.len(),
            store = self.store.name(),
            "answered"
        );

        format_reply(intent::intro_for(&query.message), &top, &web)
    }
}
