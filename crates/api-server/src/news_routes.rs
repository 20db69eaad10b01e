//! News Routes
//!
//! `/news` returns today's cached search results; `/llm-analysis` streams a
//! model-written summary of the same results.

use agri_core::{jakarta_today, NewsItem};
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use llm_client::analysis_messages;

use crate::{AppError, AppState};

pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(get_news))
        .route("/llm-analysis", get(get_llm_analysis))
}

async fn todays_news(state: &AppState) -> Result<Vec<NewsItem>, AppError> {
    Ok(state.news.get_or_fetch(jakarta_today()).await?)
}

async fn get_news(State(state): State<AppState>) -> Result<Json<Vec<NewsItem>>, AppError> {
    Ok(Json(todays_news(&state).await?))
}

/// Streams the completion as raw concatenated text.
///
/// Failures before the first fragment become an error status. Once the body
/// has started, a failure can only cut the stream short; the completion
/// client logs it.
async fn get_llm_analysis(State(state): State<AppState>) -> Result<Response, AppError> {
    let news = todays_news(&state).await?;
    let messages = analysis_messages(&news);

    tracing::info!("Streaming analysis over {} news items", news.len());
    let fragments = state.completions.stream(messages).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(fragments),
    )
        .into_response())
}
