//! Axum route handler for connection suggestions.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::connections::affinity::{get_user_recommendations, SuggestedUser};
use crate::connections::suggestions::get_simple_suggestions;
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_SUGGESTIONS: usize = 10;
const MAX_SUGGESTIONS: usize = 50;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionAlgorithm {
    #[default]
    Affinity,
    Simple,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub user_id: Uuid,
    /// Comma-separated user ids to leave out.
    pub exclude: Option<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub algorithm: SuggestionAlgorithm,
}

pub fn parse_exclude(raw: Option<&str>) -> Result<Vec<Uuid>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| AppError::Validation(format!("invalid user id in exclude: {s}")))
        })
        .collect()
}

/// GET /api/v1/connections/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionsQuery>,
) -> Result<Json<Vec<SuggestedUser>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_SUGGESTIONS);
    if !(1..=MAX_SUGGESTIONS).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_SUGGESTIONS}"
        )));
    }
    let exclude = parse_exclude(params.exclude.as_deref())?;

    let suggestions = match params.algorithm {
        SuggestionAlgorithm::Affinity => {
            get_user_recommendations(
                state.store.as_ref(),
                params.user_id,
                &exclude,
                limit,
                state.config.affinity_batch_size,
            )
            .await?
        }
        SuggestionAlgorithm::Simple => {
            get_simple_suggestions(state.store.as_ref(), params.user_id, &exclude, limit).await?
        }
    };
    Ok(Json(suggestions))
}
