//! Content-mutation notifications. Whatever owns mood, journal, habit, and
//! share-settings writes reports them here so derived state stays fresh.

pub mod handlers;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feed::cache::FeedCache;
use crate::feed::invalidation::invalidate_for_author;
use crate::feed::query::FeedPage;
use crate::sentiment::word_frequency::spawn_word_frequency_update;
use crate::store::WellnessStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MutatedResource {
    Mood,
    Journal,
    Habit,
    ShareSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEvent {
    pub user_id: Uuid,
    pub kind: MutatedResource,
    /// Journal body, when the write carried one.
    pub text: Option<String>,
}

pub struct ContentChange {
    pub invalidated: usize,
    /// Detached; callers never need to await it.
    pub word_update: Option<JoinHandle<()>>,
}

/// Invalidates cached feeds for the author and their connections before
/// returning. A journal event with text also starts a word-frequency update
/// in the background.
pub async fn on_content_changed(
    store: Arc<dyn WellnessStore>,
    cache: &FeedCache<FeedPage>,
    event: ContentEvent,
) -> Result<ContentChange, AppError> {
    let invalidated = invalidate_for_author(store.as_ref(), cache, event.user_id).await?;

    let word_update = match (event.kind, event.text) {
        (MutatedResource::Journal, Some(text)) if !text.trim().is_empty() => {
            Some(spawn_word_frequency_update(store, event.user_id, text))
        }
        _ => None,
    };

    info!(
        "{:?} change by user {}: {invalidated} feed entries invalidated",
        event.kind, event.user_id
    );
    Ok(ContentChange {
        invalidated,
        word_update,
    })
}
