use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feed::FeedItem;
use crate::models::habit::Habit;
use crate::models::insights::{BannerHistory, WordFrequency};
use crate::models::journal::JournalEntry;
use crate::models::mood::MoodLog;
use crate::models::plant::PlantGrowth;
use crate::models::social::{ContentKind, ShareSettings};
use crate::models::user::UserProfile;
use crate::store::{MutualCount, WellnessStore, WordUsageOutcome};

/// `WellnessStore` backed by the shared PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw union row; `kind` is the literal tag selected in each branch.
#[derive(Debug, FromRow)]
struct FeedRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: Option<String>,
    body: Option<String>,
    mood: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<FeedRow> for FeedItem {
    type Error = AppError;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "mood" => ContentKind::Mood,
            "journal" => ContentKind::Journal,
            "habit" => ContentKind::Habit,
            other => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "Unknown feed row kind '{other}'"
                )))
            }
        };
        Ok(FeedItem {
            id: row.id,
            user_id: row.user_id,
            kind,
            title: row.title,
            body: row.body,
            mood: row.mood,
            created_at: row.created_at,
        })
    }
}

/// Selects the ids of everyone connected to `$1`.
const CONNECTED_IDS_CTE: &str = r#"
    SELECT CASE WHEN user_a = $1 THEN user_b ELSE user_a END AS id
    FROM connections
    WHERE user_a = $1 OR user_b = $1
"#;

#[async_trait]
impl WellnessStore for PgStore {
    async fn recent_mood_logs(&self, user_id: Uuid, limit: i64) -> Result<Vec<MoodLog>, AppError> {
        Ok(sqlx::query_as::<_, MoodLog>(
            "SELECT * FROM mood_logs WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn mood_logs_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodLog>, AppError> {
        Ok(sqlx::query_as::<_, MoodLog>(
            "SELECT * FROM mood_logs WHERE user_id = $1 AND created_at >= $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn latest_journal_entry(&self, user_id: Uuid) -> Result<Option<JournalEntry>, AppError> {
        Ok(sqlx::query_as::<_, JournalEntry>(
            "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn journal_entry_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn journal_entries_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<JournalEntry>, AppError> {
        Ok(sqlx::query_as::<_, JournalEntry>(
            "SELECT * FROM journal_entries WHERE user_id = $1 AND created_at >= $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(sqlx::query_as::<_, UserProfile>(
            "SELECT id, display_name, avatar_url, current_streak, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn user_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<UserProfile>, AppError> {
        Ok(sqlx::query_as::<_, UserProfile>(
            "SELECT id, display_name, avatar_url, current_streak, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn habits(&self, user_id: Uuid) -> Result<Vec<Habit>, AppError> {
        Ok(sqlx::query_as::<_, Habit>(
            "SELECT * FROM habits WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn connection_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(sqlx::query_scalar(CONNECTED_IDS_CTE)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn mutual_connection_count(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar(
            r#"
            WITH mine AS (
                SELECT CASE WHEN user_a = $1 THEN user_b ELSE user_a END AS id
                FROM connections WHERE user_a = $1 OR user_b = $1
            ),
            theirs AS (
                SELECT CASE WHEN user_a = $2 THEN user_b ELSE user_a END AS id
                FROM connections WHERE user_a = $2 OR user_b = $2
            )
            SELECT COUNT(*) FROM mine JOIN theirs USING (id)
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn candidate_user_ids(
        &self,
        user_id: Uuid,
        exclude: &[Uuid],
        max_candidates: i64,
    ) -> Result<Vec<Uuid>, AppError> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT u.id
            FROM users u
            WHERE u.id <> $1
              AND NOT (u.id = ANY($2))
              AND NOT EXISTS (
                  SELECT 1 FROM connections c
                  WHERE (c.user_a = $1 AND c.user_b = u.id)
                     OR (c.user_b = $1 AND c.user_a = u.id)
              )
            ORDER BY u.created_at DESC, u.id
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(exclude)
        .bind(max_candidates)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn friends_of_friends(
        &self,
        user_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MutualCount>, AppError> {
        Ok(sqlx::query_as::<_, MutualCount>(
            r#"
            WITH mine AS (
                SELECT CASE WHEN user_a = $1 THEN user_b ELSE user_a END AS id
                FROM connections WHERE user_a = $1 OR user_b = $1
            ),
            second_degree AS (
                SELECT CASE WHEN c.user_a = m.id THEN c.user_b ELSE c.user_a END AS id
                FROM connections c
                JOIN mine m ON c.user_a = m.id OR c.user_b = m.id
            )
            SELECT id AS user_id, COUNT(*) AS mutual_count
            FROM second_degree
            WHERE id <> $1
              AND id NOT IN (SELECT id FROM mine)
              AND NOT (id = ANY($2))
            GROUP BY id
            ORDER BY mutual_count DESC, id
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn share_settings(&self, user_ids: &[Uuid]) -> Result<Vec<ShareSettings>, AppError> {
        Ok(sqlx::query_as::<_, ShareSettings>(
            "SELECT * FROM share_settings WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn feed_items(
        &self,
        author_ids: &[Uuid],
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedItem>, AppError> {
        let rows = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT * FROM (
                SELECT m.id, m.user_id, 'mood' AS kind, NULL::text AS title,
                       m.note AS body, m.mood, m.created_at
                FROM mood_logs m
                WHERE m.user_id = ANY($1)
                UNION ALL
                SELECT j.id, j.user_id, 'journal' AS kind, j.title,
                       j.content AS body, j.mood, j.created_at
                FROM journal_entries j
                WHERE j.user_id = ANY($1)
                UNION ALL
                SELECT hl.id, hl.user_id, 'habit' AS kind, h.title,
                       h.description AS body, NULL::int AS mood, hl.created_at
                FROM habit_logs hl
                JOIN habits h ON h.id = hl.habit_id
                WHERE hl.user_id = ANY($1) AND hl.completed
            ) feed
            WHERE ($2::timestamptz IS NULL OR feed.created_at < $2)
            ORDER BY feed.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(author_ids)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FeedItem::try_from).collect()
    }

    async fn record_word_usage(
        &self,
        user_id: Uuid,
        word: &str,
        occurrences: i32,
        sentiment: f64,
        now: DateTime<Utc>,
    ) -> Result<WordUsageOutcome, AppError> {
        // xmax = 0 only for freshly inserted tuples
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO user_word_frequencies (user_id, word, frequency, sentiment, last_used)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, word) DO UPDATE
            SET frequency = user_word_frequencies.frequency + EXCLUDED.frequency,
                last_used = EXCLUDED.last_used
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(word)
        .bind(occurrences.max(1))
        .bind(sentiment)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(if inserted {
            WordUsageOutcome::Added
        } else {
            WordUsageOutcome::Updated
        })
    }

    async fn top_words(&self, user_id: Uuid, limit: i64) -> Result<Vec<WordFrequency>, AppError> {
        Ok(sqlx::query_as::<_, WordFrequency>(
            r#"
            SELECT * FROM user_word_frequencies
            WHERE user_id = $1
            ORDER BY frequency DESC, word ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn sentiment_words(&self, user_id: Uuid) -> Result<Vec<WordFrequency>, AppError> {
        Ok(sqlx::query_as::<_, WordFrequency>(
            r#"
            SELECT * FROM user_word_frequencies
            WHERE user_id = $1 AND sentiment <> 0
            ORDER BY frequency DESC, word ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn banner_history(&self, user_id: Uuid) -> Result<Vec<BannerHistory>, AppError> {
        Ok(sqlx::query_as::<_, BannerHistory>(
            "SELECT * FROM user_banner_history WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn save_banner_history(&self, history: &BannerHistory) -> Result<(), AppError> {
        // COALESCE keeps a concurrent transition from being erased by a stale NULL
        sqlx::query(
            r#"
            INSERT INTO user_banner_history (user_id, banner_tag, seen_at, dismissed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, banner_tag) DO UPDATE
            SET seen_at = COALESCE(EXCLUDED.seen_at, user_banner_history.seen_at),
                dismissed_at = COALESCE(EXCLUDED.dismissed_at, user_banner_history.dismissed_at)
            "#,
        )
        .bind(history.user_id)
        .bind(&history.banner_tag)
        .bind(history.seen_at)
        .bind(history.dismissed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn plant_growth(&self, user_id: Uuid) -> Result<Option<PlantGrowth>, AppError> {
        Ok(sqlx::query_as::<_, PlantGrowth>(
            "SELECT user_id, level, last_growth_date FROM plant_growth WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_plant_growth(&self, plant: &PlantGrowth) -> Result<bool, AppError> {
        // a concurrent grow for the same day finds its date already written
        let result = sqlx::query(
            r#"
            INSERT INTO plant_growth (user_id, level, last_growth_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET level = EXCLUDED.level,
                last_growth_date = EXCLUDED.last_growth_date
            WHERE plant_growth.last_growth_date IS DISTINCT FROM EXCLUDED.last_growth_date
            "#,
        )
        .bind(plant.user_id)
        .bind(plant.level)
        .bind(plant.last_growth_date)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
