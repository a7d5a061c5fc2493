// src/bin/ask.rs
// Answer one chat message against a local catalog and print the reply.
//
// Example:
//   cargo run --bin ask -- --catalog data/catalog.json --web "best forex broker for beginners"

use std::path::PathBuf;

use clap::Parser;
use roku_assistant::{
    config::StoreBackend, search::ChatQuery, build_assistant, AssistantConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ask", about = "Ask the site assistant a question from the terminal")]
struct Args {
    /// Message to answer.
    message: String,

    /// Config file (defaults to $ASSISTANT_CONFIG_PATH, then config/assistant.toml).
    #[arg(long, env = "ASSISTANT_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Use this JSON catalog with the memory backend, overriding the config.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Also search the built-in site page index.
    #[arg(long)]
    web: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(p) => AssistantConfig::load_from_file(p)?,
        None => AssistantConfig::load_default()?,
    };
    if let Some(catalog) = args.catalog {
        cfg.store.backend = StoreBackend::Memory;
        cfg.store.catalog_path = catalog;
    }

    let assistant = build_assistant(&cfg)?;
    let reply = assistant
        .reply(&ChatQuery {
            message: args.message,
            search_web: args.web,
        })
        .await;
    println!("{reply}");
    Ok(())
}
