use serde::{Deserialize, Serialize};

/// Query parameters for the news listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewsQuery {
    /// Applies defaults: query "latest news", country "us" (lowercased),
    /// category only when non-empty.
    pub fn resolve(self) -> (String, String, Option<String>) {
        let query = self
            .q
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| "latest news".to_string());
        let country = self
            .country
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "us".to_string())
            .to_lowercase();
        let category = self.category.filter(|c| !c.trim().is_empty());
        (query, country, category)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub full_article_content: Option<String>,
    #[serde(default)]
    pub article_description: Option<String>,
    #[serde(default)]
    pub article_summary: Option<String>,
    #[serde(default, rename = "articleUrl")]
    pub article_url: Option<String>,
}

impl ChatRequest {
    /// Context precedence: full article text, then description, then the
    /// previously generated summary. Blank strings don't count.
    pub fn supplied_context(&self) -> Option<String> {
        [
            &self.full_article_content,
            &self.article_description,
            &self.article_summary,
        ]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .cloned()
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// A provider article plus its generated summary; the unit cached and
/// returned to clients. `summary` is always present, degraded or not, so the
/// payload shape never changes on partial failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedArticle {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: Option<String>,
    pub content: Option<String>,
}
