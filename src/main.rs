use std::sync::Arc;

use bytenews::{
    AppState,
    api::routes::create_router,
    cache::NewsCache,
    config::Config,
    llm::GeminiClient,
    news::NewsApiClient,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;

    // Create application state
    let app_state = AppState {
        provider: Arc::new(NewsApiClient::new(config.news_api_key.clone())),
        summarizer: Arc::new(GeminiClient::new(config.gemini_api_key.clone())),
        cache: Arc::new(NewsCache::new()),
        config: Arc::new(config),
    };

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener and start the server
    let listener = TcpListener::bind(server_addr).await?;
    info!(%server_addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
