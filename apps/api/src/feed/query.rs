//! Paginated friends' activity feed, filtered by each author's share settings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feed::cache::FeedCache;
use crate::feed::invalidation::{cursor_page_key, feed_scope, first_page_key};
use crate::models::feed::FeedItem;
use crate::models::social::ShareSettings;
use crate::store::WellnessStore;

pub const PAGE_SIZE: usize = 10;
const FETCH_SIZE: usize = PAGE_SIZE + 1;
const MAX_FETCH_SIZE: usize = 200;
const MAX_FETCH_ROUNDS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    /// Pass back as `cursor` to get the next page. `None` on the last page.
    pub next_cursor: Option<DateTime<Utc>>,
}

impl FeedPage {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

/// Authors without a settings row are fully visible.
pub fn is_visible(item: &FeedItem, settings: &HashMap<Uuid, ShareSettings>) -> bool {
    settings
        .get(&item.user_id)
        .map(|s| s.allows(item.kind))
        .unwrap_or(true)
}

/// One page of the user's feed, newest first, served from cache when possible.
///
/// Filtering happens after each raw fetch. Fetching continues until a full
/// page plus one visible item is collected, the source runs dry, or
/// `MAX_FETCH_ROUNDS` queries have run; each under-filled round doubles the
/// batch size up to `MAX_FETCH_SIZE`. A page cut short by the round limit
/// still carries a cursor so the caller can keep scrolling.
pub async fn get_feed_page(
    store: &dyn WellnessStore,
    cache: &FeedCache<FeedPage>,
    user_id: Uuid,
    cursor: Option<DateTime<Utc>>,
) -> Result<FeedPage, AppError> {
    let key = match cursor {
        Some(c) => cursor_page_key(user_id, c),
        None => first_page_key(user_id),
    };
    if let Some(page) = cache.get(&key) {
        debug!("Feed cache hit: {key}");
        return Ok(page);
    }

    let scope = feed_scope(user_id);
    let generation = cache.generation(&scope);

    let connections = store.connection_ids(user_id).await?;
    if connections.is_empty() {
        let page = FeedPage::empty();
        store_page(cache, &scope, generation, key, &page);
        return Ok(page);
    }

    let settings: HashMap<Uuid, ShareSettings> = store
        .share_settings(&connections)
        .await?
        .into_iter()
        .map(|s| (s.user_id, s))
        .collect();

    let mut visible = Vec::with_capacity(FETCH_SIZE);
    let mut before = cursor;
    let mut fetch_size = FETCH_SIZE;
    let mut exhausted = false;
    for _ in 0..MAX_FETCH_ROUNDS {
        let batch = store
            .feed_items(&connections, before, fetch_size as i64)
            .await?;
        exhausted = batch.len() < fetch_size;
        before = batch.last().map(|item| item.created_at).or(before);
        visible.extend(batch.into_iter().filter(|item| is_visible(item, &settings)));
        if exhausted || visible.len() >= FETCH_SIZE {
            break;
        }
        fetch_size = (fetch_size * 2).min(MAX_FETCH_SIZE);
    }

    let has_more = visible.len() > PAGE_SIZE;
    visible.truncate(PAGE_SIZE);
    let next_cursor = if has_more {
        visible.last().map(|item| item.created_at)
    } else if exhausted {
        None
    } else {
        before
    };
    let page = FeedPage {
        items: visible,
        next_cursor,
    };

    debug!("Feed cache miss: {key} ({} items)", page.items.len());
    store_page(cache, &scope, generation, key, &page);
    Ok(page)
}

fn store_page(
    cache: &FeedCache<FeedPage>,
    scope: &str,
    generation: u64,
    key: String,
    page: &FeedPage,
) {
    if !cache.set_if_current(scope, generation, key, page.clone(), None) {
        debug!("Feed for {scope} changed while loading, not caching");
    }
}
