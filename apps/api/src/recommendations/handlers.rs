//! Axum route handlers for the recommendations API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::recommendations::ranker::{dismiss_banner, get_ranked_banners, RankedBanner};
use crate::recommendations::signals::{compute_signals, detector_set, SignalView};
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DismissRequest {
    pub user_id: Uuid,
    pub tag: String,
}

/// GET /api/v1/recommendations/signals
pub async fn handle_signals(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<SignalView>>, AppError> {
    let detectors = detector_set(state.config.enable_word_usage_signals);
    let signals = compute_signals(state.store.as_ref(), params.user_id, &detectors).await;
    Ok(Json(signals.iter().map(|s| s.to_view()).collect()))
}

/// GET /api/v1/recommendations/banners
///
/// Ranked banners, best first. The top one is recorded as seen.
pub async fn handle_banners(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<RankedBanner>>, AppError> {
    let detectors = detector_set(state.config.enable_word_usage_signals);
    let banners = get_ranked_banners(state.store.as_ref(), params.user_id, &detectors).await?;
    Ok(Json(banners))
}

/// POST /api/v1/recommendations/banners/dismiss
pub async fn handle_dismiss(
    State(state): State<AppState>,
    Json(body): Json<DismissRequest>,
) -> Result<Json<Value>, AppError> {
    dismiss_banner(state.store.as_ref(), body.user_id, &body.tag).await?;
    Ok(Json(json!({ "dismissed": body.tag.trim() })))
}
