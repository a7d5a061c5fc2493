// src/lib.rs
// Public library surface for the server binary, the `ask` tool and integration tests.

pub mod api;
pub mod config;
pub mod content;
pub mod metrics;
pub mod search;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::{info, warn};

pub use crate::api::{create_router, router, AppState};
pub use crate::config::{AssistantConfig, StoreBackend};
pub use crate::search::{Assistant, ChatQuery, SiteIndex};
pub use crate::store::{Catalog, CatalogStore, ContentStore, PostgrestStore};

/// Build the content store selected in the config.
///
/// The memory backend starts empty (with a warning) when the catalog file is
/// missing; a catalog that exists but does not parse is an error.
pub fn build_store(cfg: &AssistantConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    match cfg.store.backend {
        StoreBackend::Memory => {
            let path = &cfg.store.catalog_path;
            let catalog = if path.exists() {
                Catalog::load_from_file(path)?
            } else {
                warn!(path = %path.display(), "catalog file not found, starting with empty catalog");
                Catalog::default()
            };
            info!(rows = catalog.len(), "content catalog loaded");
            Ok(Arc::new(CatalogStore::new(catalog, cfg.limits)))
        }
        StoreBackend::Postgrest => {
            let (url, key) = cfg.resolve_store_credentials()?;
            let store = PostgrestStore::new(&url, &key, cfg.limits, cfg.search.fetch_timeout())
                .context("creating postgrest store")?;
            info!(key_len = key.len(), "postgrest content store configured");
            Ok(Arc::new(store))
        }
    }
}

/// Site index from the configured override, or the built-in page list.
pub fn build_site_index(cfg: &AssistantConfig) -> SiteIndex {
    match &cfg.site_index.path {
        Some(p) => SiteIndex::load_from_file(p),
        None => SiteIndex::default_seed(),
    }
}

/// Assistant wired from config.
pub fn build_assistant(cfg: &AssistantConfig) -> anyhow::Result<Assistant> {
    let store = build_store(cfg)?;
    Ok(Assistant::new(store, build_site_index(cfg), cfg.search))
}

/// Full in-process app (no metrics route), configured from
/// `$ASSISTANT_CONFIG_PATH` / `config/assistant.toml` / defaults.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AssistantConfig::load_default()?;
    let assistant = build_assistant(&cfg)?;
    Ok(router(AppState { assistant }))
}
