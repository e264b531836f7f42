pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod news;
pub mod pipeline;

use std::sync::Arc;

use cache::NewsCache;
use config::Config;
use llm::Summarizer;
use news::NewsProvider;

/// Application state shared across handlers. The cache is created once at
/// startup and lives for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<NewsCache>,
    pub provider: Arc<dyn NewsProvider>,
    pub summarizer: Arc<dyn Summarizer>,
}
