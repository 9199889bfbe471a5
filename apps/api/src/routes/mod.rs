pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::connections::{self, limiter::limit_connection_actions};
use crate::state::AppState;
use crate::{events, feed, plant, recommendations, sentiment};

/// Query string carrying only the acting user.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    let connection_routes = Router::new()
        .route(
            "/api/v1/connections/suggestions",
            get(connections::handlers::handle_suggestions),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit_connection_actions,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendations
        .route(
            "/api/v1/recommendations/signals",
            get(recommendations::handlers::handle_signals),
        )
        .route(
            "/api/v1/recommendations/banners",
            get(recommendations::handlers::handle_banners),
        )
        .route(
            "/api/v1/recommendations/banners/dismiss",
            post(recommendations::handlers::handle_dismiss),
        )
        // Word-usage insights
        .route(
            "/api/v1/insights/words",
            get(sentiment::handlers::handle_top_words),
        )
        .route(
            "/api/v1/insights/sentiment",
            get(sentiment::handlers::handle_sentiment_profile),
        )
        // Feed
        .route("/api/v1/feed", get(feed::handlers::handle_feed))
        // Plant
        .route("/api/v1/plant/grow", post(plant::handlers::handle_grow))
        // Content mutations
        .route(
            "/api/v1/events/content",
            post(events::handlers::handle_content_event),
        )
        .merge(connection_routes)
        .with_state(state)
}
