use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::events::{on_content_changed, ContentEvent};
use crate::state::AppState;

/// POST /api/v1/events/content
/// Responds once feed invalidation is done; word counting continues after.
pub async fn handle_content_event(
    State(state): State<AppState>,
    Json(event): Json<ContentEvent>,
) -> Result<Json<Value>, AppError> {
    let change = on_content_changed(state.store.clone(), &state.feed_cache, event).await?;
    Ok(Json(json!({
        "invalidated": change.invalidated,
        "word_frequency_update": change.word_update.is_some(),
    })))
}
