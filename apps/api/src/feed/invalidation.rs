//! Cache keys for feed pages and the invalidation protocol run on every
//! content mutation.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feed::cache::FeedCache;
use crate::feed::query::FeedPage;
use crate::store::WellnessStore;

/// Generation scope covering every cached page of one user's feed.
pub fn feed_scope(user_id: Uuid) -> String {
    format!("feed:{user_id}")
}

pub fn first_page_key(user_id: Uuid) -> String {
    format!("feed:{user_id}:first")
}

pub fn cursor_page_key(user_id: Uuid, cursor: DateTime<Utc>) -> String {
    format!(
        "feed:{user_id}:cursor:{}",
        cursor.to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}

pub fn cursor_pages_wildcard(user_id: Uuid) -> String {
    format!("feed:{user_id}:cursor:*")
}

/// Drops every cached page for `user_id` and each of `connection_ids`, and
/// fences off reads already in flight for them. Returns the number of
/// entries removed.
pub fn invalidate_feed(cache: &FeedCache<FeedPage>, user_id: Uuid, connection_ids: &[Uuid]) -> usize {
    let mut removed = 0;
    for id in std::iter::once(&user_id).chain(connection_ids) {
        cache.advance_generation(&feed_scope(*id));
        removed += cache.delete(&first_page_key(*id));
        removed += cache.delete(&cursor_pages_wildcard(*id));
    }
    let stats = cache.stats();
    debug!(
        "Invalidated {removed} feed entries for user {user_id} and {} connections (cache {}/{})",
        connection_ids.len(),
        stats.len,
        stats.capacity
    );
    removed
}

/// Looks up the author's connections, then invalidates. Callers await this
/// before responding so the next feed read sees the mutation.
pub async fn invalidate_for_author(
    store: &dyn WellnessStore,
    cache: &FeedCache<FeedPage>,
    user_id: Uuid,
) -> Result<usize, AppError> {
    let connections = store.connection_ids(user_id).await?;
    Ok(invalidate_feed(cache, user_id, &connections))
}
