//! Axum route handlers for the word-usage insights API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::routes::UserIdQuery;
use crate::sentiment::word_frequency::{
    get_top_words, get_user_sentiment_profile, SentimentProfile, TopWord,
};
use crate::state::AppState;

const DEFAULT_TOP_WORDS: i64 = 20;
const MAX_TOP_WORDS: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct TopWordsQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

/// GET /api/v1/insights/words
pub async fn handle_top_words(
    State(state): State<AppState>,
    Query(params): Query<TopWordsQuery>,
) -> Result<Json<Vec<TopWord>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_WORDS);
    if !(1..=MAX_TOP_WORDS).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_TOP_WORDS}"
        )));
    }
    let words = get_top_words(state.store.as_ref(), params.user_id, limit).await?;
    Ok(Json(words))
}

/// GET /api/v1/insights/sentiment
pub async fn handle_sentiment_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SentimentProfile>, AppError> {
    let profile = get_user_sentiment_profile(state.store.as_ref(), params.user_id).await?;
    Ok(Json(profile))
}
