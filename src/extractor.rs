use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

/// Hard ceiling on extracted text, to stay within the LLM context window.
pub const MAX_TEXT_LENGTH: usize = 10_000;
pub const TRUNCATION_MARKER: &str = "... [Content truncated due to length]";
pub const NO_CONTENT_PLACEHOLDER: &str = "Could not extract main article content.";

/// Substrings that identify a previously failed extraction. Context text
/// carrying one of these must not be fed back into the LLM.
pub const FAILURE_MARKERS: [&str; 2] = ["Failed to fetch", "Could not extract"];

// Some origin servers reject requests with default client identifiers,
// so present a realistic browser User-Agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client")
});

// Create static selectors to avoid recompiling them each time
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to parse paragraph selector"));

static CLASSED_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[class]").expect("Failed to parse class selector"));

/// Ways of locating the main article container, tried in order.
#[derive(Debug, Clone, Copy)]
enum ExtractionStrategy {
    /// A dedicated element such as `<article>` or `<main>`.
    ByTag(&'static str),
    /// Any element whose class attribute loosely names article content.
    ByClassPattern,
    /// Last resort: every paragraph in the document.
    WholeDocument,
}

const STRATEGIES: [ExtractionStrategy; 4] = [
    ExtractionStrategy::ByTag("article"),
    ExtractionStrategy::ByTag("main"),
    ExtractionStrategy::ByClassPattern,
    ExtractionStrategy::WholeDocument,
];

const CLASS_PATTERNS: [&str; 3] = ["article", "content", "body"];

impl ExtractionStrategy {
    fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            ExtractionStrategy::ByTag(tag) => {
                let selector = Selector::parse(tag).ok()?;
                document.select(&selector).next()
            }
            ExtractionStrategy::ByClassPattern => {
                document.select(&CLASSED_SELECTOR).find(|element| {
                    element
                        .value()
                        .attr("class")
                        .map(|class| {
                            let class = class.to_lowercase();
                            CLASS_PATTERNS.iter().any(|p| class.contains(p))
                        })
                        .unwrap_or(false)
                })
            }
            ExtractionStrategy::WholeDocument => Some(document.root_element()),
        }
    }
}

/// Extraction outcome. Degraded results carry a fixed placeholder message so
/// callers can tell "tried and found nothing" apart from real content; the
/// distinction collapses to a plain string at the API boundary.
#[derive(Debug)]
pub enum ExtractedText {
    Full(String),
    Degraded(String),
}

impl ExtractedText {
    pub fn into_text(self) -> String {
        match self {
            ExtractedText::Full(text) => text,
            ExtractedText::Degraded(message) => message,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractedText::Degraded(_))
    }
}

/// Returns true if the text carries a marker left behind by a failed
/// extraction rather than genuine article content.
pub fn contains_failure_marker(text: &str) -> bool {
    FAILURE_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Fetch a page and extract its main article text. Best-effort: network and
/// parse failures degrade to placeholder strings, never to an error.
pub async fn extract(url: &str) -> String {
    let response = match CLIENT
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
    {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "Article fetch failed");
            return format!("Failed to fetch article content due to network error: {}", e);
        }
    };

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(%url, error = %e, "Article body read failed");
            return format!("Failed to fetch article content due to network error: {}", e);
        }
    };

    let extracted = extract_from_html(&body);
    if extracted.is_degraded() {
        debug!(%url, "No article content found in page");
    }
    extracted.into_text()
}

/// Heuristic extraction of the main article text from an HTML document.
/// Strategies run in priority order and the first one that locates a
/// container wins; only that container's paragraphs are used, so a located
/// but paragraph-free container degrades to the placeholder.
pub fn extract_from_html(html: &str) -> ExtractedText {
    let document = Html::parse_document(html);

    let container = STRATEGIES
        .iter()
        .find_map(|strategy| strategy.locate(&document));

    match container.and_then(paragraph_text) {
        Some(text) => ExtractedText::Full(cap_length(text)),
        None => ExtractedText::Degraded(NO_CONTENT_PLACEHOLDER.to_string()),
    }
}

/// Concatenates the trimmed text of every paragraph under the container,
/// with whitespace runs collapsed. None if no paragraph has any text.
fn paragraph_text(container: ElementRef) -> Option<String> {
    let paragraphs: Vec<String> = container
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        return None;
    }

    let joined = paragraphs.join("\n\n");
    Some(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn cap_length(text: String) -> String {
    if text.chars().count() <= MAX_TEXT_LENGTH {
        return text;
    }
    let mut capped: String = text.chars().take(MAX_TEXT_LENGTH).collect();
    capped.push_str(TRUNCATION_MARKER);
    capped
}
