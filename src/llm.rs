use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::warn;

pub const EMPTY_INPUT_PLACEHOLDER: &str = "No content available for summarization.";
pub const SUMMARIZATION_FAILURE: &str = "Summarization failed due to an API error.";
pub const CHAT_FAILURE: &str = "Failed to get a response from the chatbot.";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Outcome of a model call. Degraded results stand in for the text they
/// would have been, so callers always receive usable content; the variant
/// is kept distinct internally rather than collapsed at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Generated(String),
    Degraded(&'static str),
}

impl Summary {
    pub fn into_text(self) -> String {
        match self {
            Summary::Generated(text) => text,
            Summary::Degraded(message) => message.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Summary::Degraded(_))
    }
}

/// Generative text model boundary. Implementations never error: any model
/// failure is absorbed into a degraded [`Summary`].
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Condense the text into a few sentences.
    async fn summarize(&self, text: &str) -> Summary;

    /// Answer a free-form question against the supplied context.
    async fn answer(&self, question: &str, context: &str) -> Summary;
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

pub struct GeminiClient {
    api_key: String,
    client: Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self { api_key, client }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/models/{}:generateContent",
            GEMINI_BASE_URL, GEMINI_MODEL
        );
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let json: serde_json::Value =
            res.json().await.map_err(|e| AppError::Llm(e.to_string()))?;
        let reply = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| AppError::Llm("Invalid response format from LLM".to_string()))?
            .trim()
            .to_string();

        if reply.is_empty() {
            return Err(AppError::Llm("Empty completion from LLM".to_string()));
        }
        Ok(reply)
    }
}

fn summarize_prompt(text: &str) -> String {
    format!(
        "Please provide a very concise, byte-sized summary (maximum 3-4 sentences) \
         of the following news article. Focus on the main points:\n\n{}",
        text
    )
}

fn chat_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helpful news assistant. Based on the following article content, \
         answer the user's question concisely. If the question cannot be answered \
         from the provided content, politely state that the information is not \
         available.\n\n\
         Article Content: \"{}\"\n\n\
         User's Question: \"{}\"\n\n\
         Your Answer:",
        context, question
    )
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, text: &str) -> Summary {
        // Don't waste a model call on guaranteed-useless input.
        if text.trim().is_empty() {
            return Summary::Degraded(EMPTY_INPUT_PLACEHOLDER);
        }

        match self.generate(&summarize_prompt(text)).await {
            Ok(reply) => Summary::Generated(reply),
            Err(e) => {
                warn!(error = %e, "Gemini summarization failed");
                Summary::Degraded(SUMMARIZATION_FAILURE)
            }
        }
    }

    async fn answer(&self, question: &str, context: &str) -> Summary {
        match self.generate(&chat_prompt(question, context)).await {
            Ok(reply) => Summary::Generated(reply),
            Err(e) => {
                warn!(error = %e, "Gemini chat failed");
                Summary::Degraded(CHAT_FAILURE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_short_circuits_without_a_model_call() {
        // No network is reachable from here; a degraded result other than
        // the empty-input placeholder would mean a call was attempted.
        let client = GeminiClient::new("test-key".to_string());
        assert_eq!(
            client.summarize("").await,
            Summary::Degraded(EMPTY_INPUT_PLACEHOLDER)
        );
        assert_eq!(
            client.summarize("   \n\t ").await,
            Summary::Degraded(EMPTY_INPUT_PLACEHOLDER)
        );
    }

    #[test]
    fn degraded_summaries_are_never_empty() {
        for summary in [
            Summary::Degraded(EMPTY_INPUT_PLACEHOLDER),
            Summary::Degraded(SUMMARIZATION_FAILURE),
            Summary::Degraded(CHAT_FAILURE),
        ] {
            assert!(!summary.into_text().is_empty());
        }
    }

    #[test]
    fn summarize_prompt_embeds_text_and_length_constraint() {
        let prompt = summarize_prompt("the article body");
        assert!(prompt.contains("the article body"));
        assert!(prompt.contains("3-4 sentences"));
    }

    #[test]
    fn chat_prompt_embeds_context_and_question() {
        let prompt = chat_prompt("who won?", "the election coverage");
        assert!(prompt.contains("the election coverage"));
        assert!(prompt.contains("who won?"));
        assert!(prompt.contains("not available"));
    }
}
