//! Roku site assistant: binary entrypoint.
//! Boots the Axum HTTP server, wiring config, content store, metrics, and routes.

use roku_assistant::{
    api::{create_router, AppState},
    build_assistant,
    metrics::Metrics,
    AssistantConfig,
};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
/// A subscriber installed by the runtime wins; ours is then skipped.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roku_assistant=info,assistant=info,tower_http=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AssistantConfig::load_default()?;
    tracing::info!(
        backend = ?cfg.store.backend,
        top_k = cfg.search.top_k,
        fetch_timeout_ms = cfg.search.fetch_timeout_ms,
        "assistant config loaded"
    );

    // Recorder first so metric descriptions register with it.
    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let assistant = build_assistant(&cfg)?;
    let router = create_router(AppState { assistant }, metrics.as_ref());

    Ok(router.into())
}
