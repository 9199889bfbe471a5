//! Axum route handler for the friends' feed.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feed::query::{get_feed_page, FeedPage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub user_id: Uuid,
    /// RFC 3339 timestamp from a previous page's `next_cursor`.
    pub cursor: Option<DateTime<Utc>>,
}

/// GET /api/v1/feed
pub async fn handle_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> Result<Json<FeedPage>, AppError> {
    let page = get_feed_page(
        state.store.as_ref(),
        &state.feed_cache,
        params.user_id,
        params.cursor,
    )
    .await?;
    Ok(Json(page))
}
