use axum::{
    Router,
    extract::{Json, Query, State},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::AppState;
use crate::api::models::{ChatRequest, ChatResponse, EnrichedArticle, NewsQuery};
use crate::error::{AppError, Result};
use crate::extractor;
use crate::pipeline;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/news", get(news_handler))
        .route("/api/chat", post(chat_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn home_handler() -> &'static str {
    "Welcome to the ByteNews Backend! Access /api/news for articles."
}

async fn news_handler(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> Result<Json<Vec<EnrichedArticle>>> {
    let (query, country, category) = params.resolve();
    info!(%query, %country, ?category, "Processing news request");

    let articles = pipeline::fetch_and_enrich(
        &state.cache,
        state.provider.as_ref(),
        state.summarizer.as_ref(),
        &query,
        &country,
        category.as_deref(),
    )
    .await?;

    Ok(Json(articles))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let question = req
        .question
        .as_deref()
        .filter(|question| !question.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("Question is required".to_string()))?;

    // Use whatever context the client sent; with only a URL, pull the full
    // article text on demand.
    let context = match req.supplied_context() {
        Some(context) => context,
        None => match req.article_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                info!(%url, "Extracting article content for chat context");
                extractor::extract(url).await
            }
            None => {
                return Err(AppError::Validation(
                    "Missing question or article context for chatbot".to_string(),
                ));
            }
        },
    };

    // A context that is itself an extraction failure must not reach the model.
    if extractor::contains_failure_marker(&context) {
        return Err(AppError::Llm(format!(
            "Could not get article content: {}",
            context
        )));
    }

    let answer = state.summarizer.answer(&question, &context).await;
    Ok(Json(ChatResponse {
        answer: answer.into_text(),
    }))
}
