use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bottom of the mood-log scale (1 = sad … 5 = excited).
///
/// Journal entries carry their own 0–5 scale (see `JournalEntry::mood`).
/// The two are never compared against each other.
pub const MOOD_LOG_MIN: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
