// src/config/assistant.rs
use crate::search::rank::DEFAULT_TOP_K;
use crate::store::CollectionLimits;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

pub const DEFAULT_CONFIG_PATH: &str = "config/assistant.toml";
pub const ENV_CONFIG_PATH: &str = "ASSISTANT_CONFIG_PATH";

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 4_000;

pub const ENV_STORE_URL: &str = "SUPABASE_URL";
pub const ENV_STORE_KEY: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgrest,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// JSON catalog used by the memory backend.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// PostgREST base url. "ENV" means: read from SUPABASE_URL.
    #[serde(default)]
    pub url: String,
    /// "ENV" means: read from SUPABASE_ANON_KEY.
    #[serde(default)]
    pub api_key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            catalog_path: default_catalog_path(),
            url: String::new(),
            api_key: String::new(),
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl SearchSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteIndexSettings {
    /// Optional JSON override of the built-in site page list.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub limits: CollectionLimits,
    #[serde(default)]
    pub site_index: SiteIndexSettings,
}

impl AssistantConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AssistantConfig = toml::from_str(s).context("parsing assistant config")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading assistant config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Load using env var + fallback:
    /// 1) $ASSISTANT_CONFIG_PATH (must exist)
    /// 2) config/assistant.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from_file(&default);
        }
        Ok(Self::default())
    }

    fn sanitize(&mut self) {
        if self.search.top_k == 0 {
            self.search.top_k = DEFAULT_TOP_K;
        }
        if self.search.fetch_timeout_ms == 0 {
            self.search.fetch_timeout_ms = DEFAULT_FETCH_TIMEOUT_MS;
        }
    }

    /// PostgREST url and key with "ENV" placeholders resolved.
    pub fn resolve_store_credentials(&self) -> Result<(String, String)> {
        let url = resolve_env_value(&self.store.url, ENV_STORE_URL)?;
        let key = resolve_env_value(&self.store.api_key, ENV_STORE_KEY)?;
        if url.trim().is_empty() {
            bail!("store.url is required for the postgrest backend");
        }
        Ok((url, key))
    }
}

fn resolve_env_value(raw: &str, var: &str) -> Result<String> {
    if raw.trim().eq_ignore_ascii_case("env") {
        env::var(var).map_err(|_| anyhow!("Missing {var} env var"))
    } else {
        Ok(raw.to_string())
    }
}
