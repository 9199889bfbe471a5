use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::plant::growth::{check_and_grow_plant, GrowthOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GrowRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/plant/grow
/// Growing twice on one day is a no-op success.
pub async fn handle_grow(
    State(state): State<AppState>,
    Json(body): Json<GrowRequest>,
) -> Result<Json<GrowthOutcome>, AppError> {
    if state.store.user_profile(body.user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", body.user_id)));
    }
    let outcome = check_and_grow_plant(state.store.as_ref(), body.user_id).await?;
    Ok(Json(outcome))
}
