//! Persistence seam: every read and write the wellness core performs goes
//! through `WellnessStore`.
//!
//! `AppState` holds an `Arc<dyn WellnessStore>`; production wires `PgStore`,
//! tests wire the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feed::FeedItem;
use crate::models::habit::Habit;
use crate::models::insights::{BannerHistory, WordFrequency};
use crate::models::journal::JournalEntry;
use crate::models::mood::MoodLog;
use crate::models::plant::PlantGrowth;
use crate::models::social::ShareSettings;
use crate::models::user::UserProfile;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Whether a word-frequency upsert created a new row or bumped an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordUsageOutcome {
    Added,
    Updated,
}

/// A friend-of-a-friend and how many connections they share with the viewer.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct MutualCount {
    pub user_id: Uuid,
    pub mutual_count: i64,
}

#[async_trait]
pub trait WellnessStore: Send + Sync {
    // ── Mood & journal ──────────────────────────────────────────────────────

    /// Most recent mood logs first.
    async fn recent_mood_logs(&self, user_id: Uuid, limit: i64) -> Result<Vec<MoodLog>, AppError>;

    async fn mood_logs_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodLog>, AppError>;

    async fn latest_journal_entry(&self, user_id: Uuid) -> Result<Option<JournalEntry>, AppError>;

    async fn journal_entry_count(&self, user_id: Uuid) -> Result<i64, AppError>;

    async fn journal_entries_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<JournalEntry>, AppError>;

    // ── Users & habits ──────────────────────────────────────────────────────

    async fn user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    async fn user_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<UserProfile>, AppError>;

    async fn habits(&self, user_id: Uuid) -> Result<Vec<Habit>, AppError>;

    // ── Social graph ────────────────────────────────────────────────────────

    async fn connection_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn mutual_connection_count(&self, user_id: Uuid, other_id: Uuid)
        -> Result<i64, AppError>;

    /// Users who are not `user_id`, not already connected, and not in `exclude`.
    async fn candidate_user_ids(
        &self,
        user_id: Uuid,
        exclude: &[Uuid],
        max_candidates: i64,
    ) -> Result<Vec<Uuid>, AppError>;

    /// Second-degree connections ranked by shared connections, descending.
    async fn friends_of_friends(
        &self,
        user_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MutualCount>, AppError>;

    async fn share_settings(&self, user_ids: &[Uuid]) -> Result<Vec<ShareSettings>, AppError>;

    /// Mood logs, journal entries and completed habit logs by `author_ids`,
    /// newest first, strictly older than `before` when given.
    async fn feed_items(
        &self,
        author_ids: &[Uuid],
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedItem>, AppError>;

    // ── Insights ────────────────────────────────────────────────────────────

    /// Creates the (user, word) row with `sentiment` or adds `occurrences` to it.
    async fn record_word_usage(
        &self,
        user_id: Uuid,
        word: &str,
        occurrences: i32,
        sentiment: f64,
        now: DateTime<Utc>,
    ) -> Result<WordUsageOutcome, AppError>;

    async fn top_words(&self, user_id: Uuid, limit: i64) -> Result<Vec<WordFrequency>, AppError>;

    /// All rows with a non-zero sentiment.
    async fn sentiment_words(&self, user_id: Uuid) -> Result<Vec<WordFrequency>, AppError>;

    async fn banner_history(&self, user_id: Uuid) -> Result<Vec<BannerHistory>, AppError>;

    async fn save_banner_history(&self, history: &BannerHistory) -> Result<(), AppError>;

    // ── Plant ───────────────────────────────────────────────────────────────

    async fn plant_growth(&self, user_id: Uuid) -> Result<Option<PlantGrowth>, AppError>;

    /// Upserts the row unless it already carries `plant.last_growth_date`.
    /// Returns whether anything was written.
    async fn save_plant_growth(&self, plant: &PlantGrowth) -> Result<bool, AppError>;
}
