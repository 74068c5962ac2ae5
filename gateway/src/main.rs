//! Shepherd gateway - AI-assisted moderation for the community dashboard

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shepherd_gateway::{server, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("shepherd={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(server::AppState::build(args).context("startup failed")?);
    let args = &state.args;
    let config = state.learning.config();

    info!("======================================");
    info!("  Shepherd - moderation gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("LLM: {} ({})", args.llm_model, args.llm_base_url);
    info!("Oracle timeout: {}ms", config.oracle.timeout_ms);
    info!("Hints per prompt: {}", config.classifier.max_hints);
    info!("Pending capacity: {}", config.pending.capacity);
    match &config.store.journal_path {
        Some(path) => info!("Case journal: {}", path.display()),
        None => info!("Case journal: disabled (in-memory only)"),
    }
    info!("======================================");

    if !state.learning.oracle().is_available().await {
        warn!(
            "LLM backend at {} is not reachable; classifications will fall back until it is",
            args.llm_base_url
        );
    }

    if let Err(e) = server::run(state).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
