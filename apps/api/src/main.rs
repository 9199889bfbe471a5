mod config;
mod connections;
mod db;
mod errors;
mod events;
mod feed;
mod models;
mod plant;
mod recommendations;
mod routes;
mod sentiment;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::connections::limiter::AllowAll;
use crate::db::create_pool;
use crate::feed::cache::FeedCache;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sprout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Feed cache lives for the whole process
    let feed_cache = Arc::new(FeedCache::new(
        config.feed_cache_capacity,
        Duration::from_secs(config.feed_cache_ttl_secs),
    ));
    info!(
        "Feed cache initialized (capacity {}, ttl {}s)",
        config.feed_cache_capacity, config.feed_cache_ttl_secs
    );
    if config.enable_word_usage_signals {
        info!("Word-usage signals enabled");
    }

    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        feed_cache,
        config: config.clone(),
        limiter: Arc::new(AllowAll),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
