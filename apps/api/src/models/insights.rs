use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Window during which a banner that was shown is penalised on re-show.
pub const SEEN_RECENTLY_HOURS: i64 = 12;

/// Aggregate count of one word across a user's journal entries.
///
/// Rows only grow: `frequency >= 1` always, and `sentiment` is fixed when
/// the row is created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WordFrequency {
    pub user_id: Uuid,
    pub word: String,
    pub frequency: i32,
    pub sentiment: f64,
    pub last_used: DateTime<Utc>,
}

#[cfg(test)]
impl WordFrequency {
    pub fn first_use(
        user_id: Uuid,
        word: &str,
        occurrences: i32,
        sentiment: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            word: word.to_string(),
            frequency: occurrences.max(1),
            sentiment,
            last_used: now,
        }
    }

    pub fn increment_frequency(&mut self, occurrences: i32, now: DateTime<Utc>) {
        self.frequency += occurrences.max(0);
        self.last_used = now;
    }
}

/// One row per (user, banner tag). Both timestamps are overwritten on each transition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BannerHistory {
    pub user_id: Uuid,
    pub banner_tag: String,
    pub seen_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl BannerHistory {
    pub fn new(user_id: Uuid, banner_tag: &str) -> Self {
        Self {
            user_id,
            banner_tag: banner_tag.to_string(),
            seen_at: None,
            dismissed_at: None,
        }
    }

    pub fn record_seen(&mut self, now: DateTime<Utc>) {
        self.seen_at = Some(now);
    }

    pub fn record_dismissed(&mut self, now: DateTime<Utc>) {
        self.dismissed_at = Some(now);
    }

    /// Fractional days since the last dismissal, `None` if never dismissed.
    pub fn days_since_dismiss(&self, now: DateTime<Utc>) -> Option<f64> {
        self.dismissed_at
            .map(|at| (now - at).num_seconds().max(0) as f64 / 86_400.0)
    }

    pub fn seen_recently(&self, now: DateTime<Utc>) -> bool {
        self.seen_at
            .map(|at| now - at < Duration::hours(SEEN_RECENTLY_HOURS))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_keeps_sentiment() {
        let now = Utc::now();
        let mut row = WordFrequency::first_use(Uuid::new_v4(), "calm", 2, 0.8, now);
        row.increment_frequency(3, now + Duration::days(1));
        assert_eq!(row.frequency, 5);
        assert_eq!(row.sentiment, 0.8);
        assert_eq!(row.last_used, now + Duration::days(1));
    }

    #[test]
    fn test_first_use_frequency_is_at_least_one() {
        let row = WordFrequency::first_use(Uuid::new_v4(), "tired", 0, -0.8, Utc::now());
        assert_eq!(row.frequency, 1);
    }

    #[test]
    fn test_days_since_dismiss() {
        let now = Utc::now();
        let mut history = BannerHistory::new(Uuid::new_v4(), "journal_gap");
        assert_eq!(history.days_since_dismiss(now), None);
        history.record_dismissed(now - Duration::hours(36));
        let days = history.days_since_dismiss(now).unwrap();
        assert!((days - 1.5).abs() < 1e-9, "days was {days}");
    }

    #[test]
    fn test_redismiss_overwrites() {
        let now = Utc::now();
        let mut history = BannerHistory::new(Uuid::new_v4(), "low_mood");
        history.record_dismissed(now - Duration::days(10));
        history.record_dismissed(now - Duration::days(1));
        assert_eq!(history.dismissed_at, Some(now - Duration::days(1)));
    }

    #[test]
    fn test_seen_recently_window() {
        let now = Utc::now();
        let mut history = BannerHistory::new(Uuid::new_v4(), "mood_drop");
        assert!(!history.seen_recently(now));
        history.record_seen(now - Duration::hours(11));
        assert!(history.seen_recently(now));
        history.record_seen(now - Duration::hours(13));
        assert!(!history.seen_recently(now));
    }
}
