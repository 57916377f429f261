//! AminoVerse API server
//!
//! Run with: cargo run -p aminoverse-web

use aminoverse_config::{Config, LlmProvider};
use aminoverse_web::{router::build_router, state::AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aminoverse=debug,info")),
        )
        .init();

    info!("Starting AminoVerse API...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!(
        "Configuration loaded. LLM: {:?} / {}, organism: {}",
        config.llm.provider, config.llm.model, config.sources.organism_id
    );
    if config.llm.provider == LlmProvider::Gemini && config.llm.resolved_api_key().is_none() {
        tracing::warn!("No Gemini API key configured. Analysis and conversation will return null.");
    }

    let state = AppState::from_config(&config)?;
    let app = build_router(state, config.server.cors_permissive);

    let addr = std::env::var("AMINOVERSE_BIND").unwrap_or_else(|_| config.server.bind_addr());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
