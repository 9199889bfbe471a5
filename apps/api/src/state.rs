use std::sync::Arc;

use crate::config::Config;
use crate::connections::limiter::ActionLimiter;
use crate::feed::cache::FeedCache;
use crate::feed::query::FeedPage;
use crate::store::WellnessStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence seam. `PgStore` in production.
    pub store: Arc<dyn WellnessStore>,
    /// Process-local feed page cache, built once at startup.
    pub feed_cache: Arc<FeedCache<FeedPage>>,
    pub config: Config,
    /// Rate-limit hook for connection actions. Default: `AllowAll`.
    pub limiter: Arc<dyn ActionLimiter>,
}
