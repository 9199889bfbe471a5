//! Behavioural affinity between users, used to rank connection suggestions.
//!
//! Each user is reduced to a `UserVector` over the last 30 days. A candidate's
//! affinity is a weighted sum of six per-dimension similarities, each in [0, 1].

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::habit::Habit;
use crate::store::WellnessStore;

pub const ACTIVITY_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Upper bound on users scored per request.
const MAX_CANDIDATES: i64 = 500;

const MUTUAL_SATURATION: f64 = 5.0;
const NEW_ACCOUNT_DAYS: f64 = 14.0;
const BALANCE_CONNECTIONS: f64 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Weights & reasons
// ────────────────────────────────────────────────────────────────────────────

pub const WEIGHT_MUTUAL: f64 = 0.25;
pub const WEIGHT_RECENCY: f64 = 0.15;
pub const WEIGHT_MOOD_FREQUENCY: f64 = 0.15;
pub const WEIGHT_HABITS: f64 = 0.20;
pub const WEIGHT_JOURNAL: f64 = 0.15;
pub const WEIGHT_BALANCE: f64 = 0.10;

const REASON_MUTUAL: f64 = 0.3;
const REASON_RECENCY: f64 = 0.5;
const REASON_MOOD_FREQUENCY: f64 = 0.7;
const REASON_HABITS: f64 = 0.5;
const REASON_JOURNAL: f64 = 0.7;
const REASON_BALANCE: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Habit categories
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitCategory {
    Fitness,
    Mindfulness,
    Nutrition,
    Sleep,
    Learning,
    Social,
    Other,
}

pub const HABIT_CATEGORIES: [HabitCategory; 7] = [
    HabitCategory::Fitness,
    HabitCategory::Mindfulness,
    HabitCategory::Nutrition,
    HabitCategory::Sleep,
    HabitCategory::Learning,
    HabitCategory::Social,
    HabitCategory::Other,
];

/// First match wins, in this order.
static CATEGORY_PATTERNS: LazyLock<Vec<(HabitCategory, Regex)>> = LazyLock::new(|| {
    [
        (
            HabitCategory::Fitness,
            r"(?i)\b(run|running|jog\w*|gym|workout|exercise|yoga|walk\w*|swim\w*|cycl\w*|bike|lift\w*|stretch\w*|steps)\b",
        ),
        (
            HabitCategory::Mindfulness,
            r"(?i)\b(meditat\w*|mindful\w*|breath\w*|gratitude|journal\w*|pray\w*|calm)\b",
        ),
        (
            HabitCategory::Nutrition,
            r"(?i)\b(water|eat\w*|diet|vegetables?|fruits?|cook\w*|meals?|sugar|protein|snacks?)\b",
        ),
        (
            HabitCategory::Sleep,
            r"(?i)\b(sleep\w*|bed|bedtime|naps?|wake|rest)\b",
        ),
        (
            HabitCategory::Learning,
            r"(?i)\b(read\w*|study\w*|learn\w*|books?|courses?|practice|languages?)\b",
        ),
        (
            HabitCategory::Social,
            r"(?i)\b(call\w*|friends?|family|text\w*|volunteer\w*|social\w*)\b",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).expect("static regex")))
    .collect()
});

pub fn categorize_habit(habit: &Habit) -> HabitCategory {
    let text = habit.searchable_text();
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&text))
        .map(|(category, _)| *category)
        .unwrap_or(HabitCategory::Other)
}

/// Share of habits per category, in `HABIT_CATEGORIES` order. All zeros when
/// there are no habits.
pub fn habit_profile(habits: &[Habit]) -> [f64; 7] {
    let mut counts = [0.0; 7];
    for habit in habits {
        let category = categorize_habit(habit);
        if let Some(idx) = HABIT_CATEGORIES.iter().position(|c| *c == category) {
            counts[idx] += 1.0;
        }
    }
    if !habits.is_empty() {
        let total = habits.len() as f64;
        counts.iter_mut().for_each(|c| *c /= total);
    }
    counts
}

// ────────────────────────────────────────────────────────────────────────────
// Vectors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct UserVector {
    pub user_id: Uuid,
    /// `None` when the profile could not be read.
    pub account_age_days: Option<f64>,
    pub mood_logs_per_week: f64,
    pub habit_profile: [f64; 7],
    pub journals_per_week: f64,
    pub avg_journal_words: f64,
    pub connection_count: usize,
}

impl UserVector {
    /// Neutral vector for users whose data could not be loaded.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            account_age_days: None,
            mood_logs_per_week: 0.0,
            habit_profile: [0.0; 7],
            journals_per_week: 0.0,
            avg_journal_words: 0.0,
            connection_count: 0,
        }
    }
}

fn per_week(count: usize) -> f64 {
    count as f64 / (ACTIVITY_WINDOW_DAYS as f64 / 7.0)
}

pub async fn build_user_vector(
    store: &dyn WellnessStore,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<UserVector, AppError> {
    let since = now - Duration::days(ACTIVITY_WINDOW_DAYS);
    let profile = store.user_profile(user_id).await?;
    let moods = store.mood_logs_since(user_id, since).await?;
    let journals = store.journal_entries_since(user_id, since).await?;
    let habits = store.habits(user_id).await?;
    let connections = store.connection_ids(user_id).await?;

    let avg_journal_words = if journals.is_empty() {
        0.0
    } else {
        journals.iter().map(|j| j.word_count() as f64).sum::<f64>() / journals.len() as f64
    };

    Ok(UserVector {
        user_id,
        account_age_days: profile
            .map(|p| (now - p.created_at).num_seconds().max(0) as f64 / 86_400.0),
        mood_logs_per_week: per_week(moods.len()),
        habit_profile: habit_profile(&habits),
        journals_per_week: per_week(journals.len()),
        avg_journal_words,
        connection_count: connections.len(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Similarity
// ────────────────────────────────────────────────────────────────────────────

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let magnitude_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }
    dot / (magnitude_a * magnitude_b)
}

/// `1 - |a - b| / max(a, b)`; zero when both are zero.
pub fn frequency_similarity(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max <= 0.0 {
        return 0.0;
    }
    1.0 - (a - b).abs() / max
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AffinityBreakdown {
    pub mutual_connections: f64,
    pub recency: f64,
    pub mood_frequency: f64,
    pub habit_similarity: f64,
    pub journal_patterns: f64,
    pub connection_balance: f64,
}

impl AffinityBreakdown {
    pub fn total(&self) -> f64 {
        self.mutual_connections * WEIGHT_MUTUAL
            + self.recency * WEIGHT_RECENCY
            + self.mood_frequency * WEIGHT_MOOD_FREQUENCY
            + self.habit_similarity * WEIGHT_HABITS
            + self.journal_patterns * WEIGHT_JOURNAL
            + self.connection_balance * WEIGHT_BALANCE
    }

    pub fn match_reasons(&self) -> Vec<String> {
        [
            (self.mutual_connections > REASON_MUTUAL, "You have mutual connections"),
            (self.recency > REASON_RECENCY, "New to the community"),
            (self.mood_frequency > REASON_MOOD_FREQUENCY, "Checks in as often as you do"),
            (self.habit_similarity > REASON_HABITS, "Works on similar habits"),
            (self.journal_patterns > REASON_JOURNAL, "Journals like you do"),
            (self.connection_balance > REASON_BALANCE, "Looking for connections"),
        ]
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, reason)| reason.to_string())
        .collect()
    }
}

/// Scores `candidate` from `user`'s point of view.
pub fn score_pair(user: &UserVector, candidate: &UserVector, mutual_count: i64) -> AffinityBreakdown {
    let recency = candidate
        .account_age_days
        .map(|age| ((NEW_ACCOUNT_DAYS - age) / NEW_ACCOUNT_DAYS).max(0.0))
        .unwrap_or(0.0);

    let connection_balance = if (candidate.connection_count as f64) < BALANCE_CONNECTIONS {
        (BALANCE_CONNECTIONS - candidate.connection_count as f64) / BALANCE_CONNECTIONS
    } else {
        0.0
    };

    let journal_patterns = (frequency_similarity(user.journals_per_week, candidate.journals_per_week)
        + frequency_similarity(user.avg_journal_words, candidate.avg_journal_words))
        / 2.0;

    AffinityBreakdown {
        mutual_connections: (mutual_count.max(0) as f64 / MUTUAL_SATURATION).min(1.0),
        recency: recency.min(1.0),
        mood_frequency: frequency_similarity(user.mood_logs_per_week, candidate.mood_logs_per_week),
        habit_similarity: cosine_similarity(&user.habit_profile, &candidate.habit_profile),
        journal_patterns,
        connection_balance,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Suggestions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestedUser {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub match_reasons: Vec<String>,
    pub score: f64,
}

struct ScoredCandidate {
    user_id: Uuid,
    breakdown: AffinityBreakdown,
}

async fn score_candidate(
    store: &dyn WellnessStore,
    user: &UserVector,
    candidate_id: Uuid,
    now: DateTime<Utc>,
) -> ScoredCandidate {
    let vector = build_user_vector(store, candidate_id, now)
        .await
        .unwrap_or_else(|e| {
            warn!("Could not build vector for candidate {candidate_id}: {e}");
            UserVector::empty(candidate_id)
        });
    let mutual = store
        .mutual_connection_count(user.user_id, candidate_id)
        .await
        .unwrap_or_else(|e| {
            warn!("Could not count mutual connections with {candidate_id}: {e}");
            0
        });
    ScoredCandidate {
        user_id: candidate_id,
        breakdown: score_pair(user, &vector, mutual),
    }
}

/// Top `limit` candidates by affinity, best first.
///
/// Candidates are scored in batches of `batch_size`; the ranking is global
/// across batches.
pub async fn get_user_recommendations(
    store: &dyn WellnessStore,
    user_id: Uuid,
    exclude: &[Uuid],
    limit: usize,
    batch_size: usize,
) -> Result<Vec<SuggestedUser>, AppError> {
    let now = Utc::now();
    let user = build_user_vector(store, user_id, now)
        .await
        .unwrap_or_else(|e| {
            warn!("Could not build vector for user {user_id}: {e}");
            UserVector::empty(user_id)
        });
    let candidates = store
        .candidate_user_ids(user_id, exclude, MAX_CANDIDATES)
        .await?;

    let mut scored = Vec::with_capacity(candidates.len());
    for batch in candidates.chunks(batch_size.max(1)) {
        let results = join_all(
            batch
                .iter()
                .map(|id| score_candidate(store, &user, *id, now)),
        )
        .await;
        scored.extend(results);
    }
    debug!("Scored {} candidates for user {user_id}", scored.len());

    scored.sort_by(|a, b| b.breakdown.total().total_cmp(&a.breakdown.total()));
    scored.truncate(limit);

    let ids: Vec<Uuid> = scored.iter().map(|c| c.user_id).collect();
    let profiles: HashMap<Uuid, _> = store
        .user_profiles(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(scored
        .into_iter()
        .filter_map(|c| {
            let profile = profiles.get(&c.user_id)?;
            Some(SuggestedUser {
                id: c.user_id,
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar_url.clone(),
                match_reasons: c.breakdown.match_reasons(),
                score: (c.breakdown.total() * 100.0).round() / 100.0,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::MoodLog;
    use crate::models::social::Connection;
    use crate::models::user::UserProfile;
    use crate::store::memory::MemoryStore;

    fn habit(title: &str) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.to_string(),
            description: None,
            streak: 0,
            created_at: Utc::now(),
        }
    }

    fn profile(id: Uuid, name: &str, age_days: i64) -> UserProfile {
        UserProfile {
            id,
            display_name: name.to_string(),
            avatar_url: None,
            current_streak: 0,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_MUTUAL
            + WEIGHT_RECENCY
            + WEIGHT_MOOD_FREQUENCY
            + WEIGHT_HABITS
            + WEIGHT_JOURNAL
            + WEIGHT_BALANCE;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_categorize_habits() {
        assert_eq!(categorize_habit(&habit("Morning run")), HabitCategory::Fitness);
        assert_eq!(categorize_habit(&habit("Meditate 10 minutes")), HabitCategory::Mindfulness);
        assert_eq!(categorize_habit(&habit("Drink water")), HabitCategory::Nutrition);
        assert_eq!(categorize_habit(&habit("Bedtime by 11")), HabitCategory::Sleep);
        assert_eq!(categorize_habit(&habit("Read 20 pages")), HabitCategory::Learning);
        assert_eq!(categorize_habit(&habit("Call mom")), HabitCategory::Social);
        assert_eq!(categorize_habit(&habit("Water the plants")), HabitCategory::Nutrition);
        assert_eq!(categorize_habit(&habit("Polish shoes")), HabitCategory::Other);
    }

    #[test]
    fn test_habit_profile_is_normalized() {
        let profile = habit_profile(&[habit("run"), habit("yoga"), habit("read")]);
        assert!((profile.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((profile[0] - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(habit_profile(&[]), [0.0; 7]);
    }

    #[test]
    fn test_frequency_similarity() {
        assert_eq!(frequency_similarity(0.0, 0.0), 0.0);
        assert_eq!(frequency_similarity(4.0, 4.0), 1.0);
        assert_eq!(frequency_similarity(2.0, 4.0), 0.5);
        assert_eq!(frequency_similarity(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_score_pair_dimensions() {
        let user = UserVector {
            mood_logs_per_week: 4.0,
            habit_profile: [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            journals_per_week: 2.0,
            avg_journal_words: 100.0,
            connection_count: 20,
            account_age_days: Some(200.0),
            ..UserVector::empty(Uuid::new_v4())
        };
        let candidate = UserVector {
            account_age_days: Some(7.0),
            connection_count: 5,
            ..user.clone()
        };

        let breakdown = score_pair(&user, &candidate, 10);
        assert_eq!(breakdown.mutual_connections, 1.0, "saturates at five");
        assert_eq!(breakdown.recency, 0.5);
        assert_eq!(breakdown.mood_frequency, 1.0);
        assert!((breakdown.habit_similarity - 1.0).abs() < 1e-9);
        assert_eq!(breakdown.journal_patterns, 1.0);
        assert_eq!(breakdown.connection_balance, 0.5);
        assert!((breakdown.total() - (1.0 - 0.15 * 0.5 - 0.10 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_old_busy_accounts_get_no_recency_or_balance() {
        let user = UserVector::empty(Uuid::new_v4());
        let candidate = UserVector {
            account_age_days: Some(60.0),
            connection_count: 12,
            ..UserVector::empty(Uuid::new_v4())
        };
        let breakdown = score_pair(&user, &candidate, 0);
        assert_eq!(breakdown.recency, 0.0);
        assert_eq!(breakdown.connection_balance, 0.0);
        assert_eq!(breakdown.total(), 0.0);
        assert!(breakdown.match_reasons().is_empty());
    }

    #[test]
    fn test_match_reasons_thresholds() {
        let breakdown = AffinityBreakdown {
            mutual_connections: 0.4,
            habit_similarity: 0.9,
            ..Default::default()
        };
        assert_eq!(
            breakdown.match_reasons(),
            vec!["You have mutual connections", "Works on similar habits"]
        );
    }

    #[tokio::test]
    async fn test_recommendations_rank_and_limit() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        let friend = Uuid::new_v4();
        let friend2 = Uuid::new_v4();
        let close = Uuid::new_v4();
        let far = Uuid::new_v4();
        let excluded = Uuid::new_v4();
        store.with(|d| {
            d.users.push(profile(me, "me", 100));
            d.users.push(profile(friend, "friend", 100));
            d.users.push(profile(friend2, "friend2", 100));
            d.users.push(profile(close, "close", 3));
            d.users.push(profile(far, "far", 400));
            d.users.push(profile(excluded, "excluded", 1));
            d.connections.push(Connection::between(me, friend, Utc::now()));
            d.connections.push(Connection::between(me, friend2, Utc::now()));
            d.connections.push(Connection::between(friend, close, Utc::now()));
            d.connections.push(Connection::between(friend2, close, Utc::now()));
            for id in [me, close] {
                d.mood_logs.push(MoodLog {
                    id: Uuid::new_v4(),
                    user_id: id,
                    mood: 3,
                    note: None,
                    created_at: Utc::now() - Duration::days(1),
                });
            }
        });

        let suggestions = get_user_recommendations(&store, me, &[excluded], 10, 1)
            .await
            .unwrap();
        let ids: Vec<Uuid> = suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids[0], close);
        assert!(!ids.contains(&friend), "existing connections are skipped");
        assert!(!ids.contains(&excluded));
        assert!(!ids.contains(&me));
        assert!(suggestions[0]
            .match_reasons
            .contains(&"You have mutual connections".to_string()));

        let limited = get_user_recommendations(&store, me, &[excluded], 1, 50)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, close);
    }

    #[tokio::test]
    async fn test_batch_size_does_not_change_ranking() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        store.with(|d| {
            d.users.push(profile(me, "me", 100));
            for age in 0..12 {
                d.users.push(profile(Uuid::new_v4(), &format!("u{age}"), age));
            }
        });

        let whole = get_user_recommendations(&store, me, &[], 12, 50).await.unwrap();
        let batched = get_user_recommendations(&store, me, &[], 12, 5).await.unwrap();
        let ids = |s: &[SuggestedUser]| s.iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids(&whole), ids(&batched));
        assert_eq!(whole[0].display_name, "u0");
    }

    #[tokio::test]
    async fn test_failed_candidate_lookup_falls_back() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.with(|d| {
            d.users.push(profile(me, "me", 100));
            d.users.push(profile(other, "other", 2));
        });
        store.fail_on("mutual_connection_count");

        let suggestions = get_user_recommendations(&store, me, &[], 5, 50).await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].id, other);
    }

    #[tokio::test]
    async fn test_failed_own_vector_falls_back() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        let friend = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.with(|d| {
            d.users.push(profile(me, "me", 100));
            d.users.push(profile(friend, "friend", 100));
            d.users.push(profile(other, "other", 2));
            d.connections.push(Connection::between(me, friend, Utc::now()));
        });
        store.fail_on("habits");

        let suggestions = get_user_recommendations(&store, me, &[], 5, 50).await.unwrap();
        let ids: Vec<Uuid> = suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![other]);
    }
}
