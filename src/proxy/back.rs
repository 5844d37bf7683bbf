use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::Config;
use crate::infer::Client;

mod handlers;

pub use handlers::build_router;

/// State shared by all handlers.
pub struct AppState {
    pub client: Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::new(config)?,
        })
    }
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    if config.groq.api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set, Groq requests will fail");
    }
    if config.huggingface_router.api_key.is_none() {
        tracing::warn!("HUGGINGFACE_API_KEY is not set, Hugging Face requests must carry apiKey");
    }
    let state = Arc::new(AppState::new(config)?);

    let router = build_router(state);

    // Start server
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router.into_make_service())
        .await
        .context("Server error")
}
