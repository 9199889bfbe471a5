//! Hook point for per-user rate limiting of connection actions.
//!
//! The limiting algorithm lives outside this service. `AllowAll` is the
//! default; deployments swap in their own `ActionLimiter` through `AppState`.

use async_trait::async_trait;
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::routes::UserIdQuery;
use crate::state::AppState;

pub const CONNECTION_ACTIONS: &str = "connections";

#[async_trait]
pub trait ActionLimiter: Send + Sync {
    /// Whether `user_id` (if known) may perform `action` now.
    async fn allow(&self, action: &str, user_id: Option<Uuid>) -> bool;
}

pub struct AllowAll;

#[async_trait]
impl ActionLimiter for AllowAll {
    async fn allow(&self, _action: &str, _user_id: Option<Uuid>) -> bool {
        true
    }
}

/// Rejects with 429 when the configured limiter refuses the caller.
pub async fn limit_connection_actions(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = Query::<UserIdQuery>::try_from_uri(request.uri())
        .ok()
        .map(|Query(q)| q.user_id);

    if !state.limiter.allow(CONNECTION_ACTIONS, user_id).await {
        warn!("Rate limit hit for {CONNECTION_ACTIONS} by {user_id:?}");
        return Err(AppError::TooManyRequests);
    }
    Ok(next.run(request).await)
}
