use crate::api::models::EnrichedArticle;
use crate::cache::{Fingerprint, NewsCache};
use crate::error::Result;
use crate::llm::Summarizer;
use crate::news::{
    DEFAULT_SOURCE, DEFAULT_TITLE, DEFAULT_URL, NewsProvider, PLACEHOLDER_IMAGE, RawArticle,
};
use futures::future::join_all;
use tracing::info;

/// Resolve a news request: serve from cache when fresh, otherwise fetch raw
/// articles, attach a summary to each, cache the assembled list, and return
/// it in provider order.
///
/// Only a failed provider fetch aborts; per-article summarization failures
/// degrade to placeholder summaries.
pub async fn fetch_and_enrich(
    cache: &NewsCache,
    provider: &dyn NewsProvider,
    summarizer: &dyn Summarizer,
    query: &str,
    country: &str,
    category: Option<&str>,
) -> Result<Vec<EnrichedArticle>> {
    let fingerprint = Fingerprint::new(query, country, category);
    if let Some(cached) = cache.lookup(&fingerprint) {
        info!(query, country, category, "Serving news from cache");
        return Ok(cached);
    }

    let articles = provider.fetch_articles(query, country, category).await?;

    // Summarization dominates latency and the calls are independent, so fan
    // them out; join_all yields results in input order.
    let summaries = join_all(articles.iter().map(|article| {
        let text = text_to_summarize(article);
        async move { summarizer.summarize(&text).await }
    }))
    .await;

    let enriched: Vec<EnrichedArticle> = articles
        .into_iter()
        .zip(summaries)
        .map(|(article, summary)| enrich(article, summary.into_text()))
        .collect();

    // One write for the complete list; partial results are never cached.
    cache.store(fingerprint, enriched.clone());
    Ok(enriched)
}

/// Full content is richer than the description when present, even though the
/// provider often truncates it.
fn text_to_summarize(article: &RawArticle) -> String {
    article
        .content
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .or_else(|| {
            article
                .description
                .as_deref()
                .filter(|text| !text.trim().is_empty())
        })
        .unwrap_or_default()
        .to_string()
}

fn enrich(article: RawArticle, summary: String) -> EnrichedArticle {
    EnrichedArticle {
        title: article.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        summary,
        url: article.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        source: article
            .source
            .and_then(|source| source.name)
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        image_url: article
            .url_to_image
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        description: article.description,
        content: article.content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::{EMPTY_INPUT_PLACEHOLDER, SUMMARIZATION_FAILURE, Summary};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        articles: Vec<RawArticle>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockProvider {
        fn returning(articles: Vec<RawArticle>) -> Self {
            Self {
                articles,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                articles: vec![],
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl NewsProvider for MockProvider {
        async fn fetch_articles(
            &self,
            _query: &str,
            _country: &str,
            _category: Option<&str>,
        ) -> Result<Vec<RawArticle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Upstream("provider down".to_string()));
            }
            Ok(self.articles.clone())
        }
    }

    /// Summarizer that fails for any text containing `fail_on`.
    struct ScriptedSummarizer {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        async fn summarize(&self, text: &str) -> Summary {
            if text.trim().is_empty() {
                return Summary::Degraded(EMPTY_INPUT_PLACEHOLDER);
            }
            if let Some(fail_on) = self.fail_on {
                if text.contains(fail_on) {
                    return Summary::Degraded(SUMMARIZATION_FAILURE);
                }
            }
            Summary::Generated(format!("summary of {}", text))
        }

        async fn answer(&self, question: &str, _context: &str) -> Summary {
            Summary::Generated(format!("answer to {}", question))
        }
    }

    fn article(title: &str, content: &str) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failed_summary_degrades_without_dropping_the_article() {
        let cache = NewsCache::new();
        let provider = MockProvider::returning(vec![
            article("one", "first body"),
            article("two", "second body"),
            article("three", "third body"),
        ]);
        let summarizer = ScriptedSummarizer {
            fail_on: Some("second"),
        };

        let enriched = fetch_and_enrich(&cache, &provider, &summarizer, "q", "us", None)
            .await
            .unwrap();

        assert_eq!(enriched.len(), 3);
        assert_eq!(
            enriched.iter().map(|a| a.title.as_str()).collect::<Vec<_>>(),
            ["one", "two", "three"]
        );
        assert_eq!(enriched[0].summary, "summary of first body");
        assert_eq!(enriched[1].summary, SUMMARIZATION_FAILURE);
        assert_eq!(enriched[2].summary, "summary of third body");
    }

    #[tokio::test]
    async fn enriches_single_article_with_defaults_for_missing_fields() {
        let cache = NewsCache::new();
        let provider = MockProvider::returning(vec![RawArticle {
            title: Some("X".to_string()),
            content: Some("long text".to_string()),
            url: Some("http://a".to_string()),
            ..Default::default()
        }]);
        let summarizer = ScriptedSummarizer { fail_on: None };

        let enriched = fetch_and_enrich(&cache, &provider, &summarizer, "elections", "us", None)
            .await
            .unwrap();

        assert_eq!(enriched.len(), 1);
        let article = &enriched[0];
        assert_eq!(article.title, "X");
        assert_eq!(article.url, "http://a");
        assert_eq!(article.summary, "summary of long text");
        assert_eq!(article.source, DEFAULT_SOURCE);
        assert_eq!(article.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(article.content.as_deref(), Some("long text"));
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let cache = NewsCache::new();
        let provider = MockProvider::returning(vec![article("one", "body")]);
        let summarizer = ScriptedSummarizer { fail_on: None };

        let first = fetch_and_enrich(&cache, &provider, &summarizer, "q", "us", Some("tech"))
            .await
            .unwrap();
        let second = fetch_and_enrich(&cache, &provider, &summarizer, "q", "us", Some("tech"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn differing_request_goes_back_upstream() {
        let cache = NewsCache::new();
        let provider = MockProvider::returning(vec![article("one", "body")]);
        let summarizer = ScriptedSummarizer { fail_on: None };

        fetch_and_enrich(&cache, &provider, &summarizer, "q", "us", None)
            .await
            .unwrap();
        fetch_and_enrich(&cache, &provider, &summarizer, "q", "gb", None)
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_failure_aborts_and_caches_nothing() {
        let cache = NewsCache::new();
        let provider = MockProvider::failing();
        let summarizer = ScriptedSummarizer { fail_on: None };

        let result = fetch_and_enrich(&cache, &provider, &summarizer, "q", "us", None).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(cache.lookup(&Fingerprint::new("q", "us", None)).is_none());
    }

    #[tokio::test]
    async fn prefers_content_and_falls_back_to_description() {
        let cache = NewsCache::new();
        let provider = MockProvider::returning(vec![
            RawArticle {
                title: Some("both".to_string()),
                content: Some("the content".to_string()),
                description: Some("the description".to_string()),
                ..Default::default()
            },
            RawArticle {
                title: Some("description only".to_string()),
                content: Some("   ".to_string()),
                description: Some("the description".to_string()),
                ..Default::default()
            },
            RawArticle {
                title: Some("neither".to_string()),
                ..Default::default()
            },
        ]);
        let summarizer = ScriptedSummarizer { fail_on: None };

        let enriched = fetch_and_enrich(&cache, &provider, &summarizer, "q", "us", None)
            .await
            .unwrap();

        assert_eq!(enriched[0].summary, "summary of the content");
        assert_eq!(enriched[1].summary, "summary of the description");
        assert_eq!(enriched[2].summary, EMPTY_INPUT_PLACEHOLDER);
    }
}
