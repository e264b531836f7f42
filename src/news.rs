use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_SOURCE: &str = "Unknown Source";
pub const DEFAULT_URL: &str = "#";
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400/cccccc/000000?text=No+Image";

const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
// Three UI sections of three articles each.
const PAGE_SIZE: u32 = 9;

/// An article as returned by the news provider. Any field may be missing or
/// null; defaults are applied when the article is enriched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Upstream article source. A failed fetch is fatal to the request that
/// triggered it, so implementations return a real error here rather than
/// degrading.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_articles(
        &self,
        query: &str,
        country: &str,
        category: Option<&str>,
    ) -> Result<Vec<RawArticle>>;
}

pub struct NewsApiClient {
    api_key: String,
    client: Client,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self { api_key, client }
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn fetch_articles(
        &self,
        query: &str,
        country: &str,
        category: Option<&str>,
    ) -> Result<Vec<RawArticle>> {
        // With a category, use country-and-category headlines filtered by the
        // query; otherwise fall back to general search.
        let mut request = match category {
            Some(category) => self
                .client
                .get(format!("{}/top-headlines", NEWSAPI_BASE_URL))
                .query(&[("country", country), ("category", category), ("q", query)]),
            None => self
                .client
                .get(format!("{}/everything", NEWSAPI_BASE_URL))
                .query(&[("q", query)]),
        };
        let page_size = PAGE_SIZE.to_string();
        request = request.query(&[
            ("language", "en"),
            ("pageSize", page_size.as_str()),
            ("apiKey", self.api_key.as_str()),
        ]);

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())?;

        let payload: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid provider response: {}", e)))?;

        info!(
            count = payload.articles.len(),
            query, country, category, "Fetched articles from provider"
        );
        Ok(payload.articles)
    }
}
