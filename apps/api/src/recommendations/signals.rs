//! Signal detectors: independent checks over a user's recent activity, each
//! producing at most one nudge signal.
//!
//! Every detector is split in two: an async `Detector::run` arm that reads
//! from the store, and a pure `detect_*` function that classifies what was
//! read against `now`. Detectors never write.

use chrono::{DateTime, Duration, Timelike, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::journal::JournalEntry;
use crate::models::mood::{MoodLog, MOOD_LOG_MIN};
use crate::sentiment::analyzer::{is_distressed, is_positive};
use crate::sentiment::word_frequency::{get_user_sentiment_profile, SentimentProfile};
use crate::store::WellnessStore;

const RECENT_MOOD_HOURS: i64 = 24;
const RECENT_JOURNAL_HOURS: i64 = 48;
const MOOD_DROP_THRESHOLD: i32 = 2;
const MOOD_SWING_THRESHOLD: i32 = 3;
const LOW_MOOD_MAX: i32 = MOOD_LOG_MIN;
const STREAK_RESET_GAP_DAYS: i64 = 2;
const JOURNAL_GAP_DAYS: i64 = 3;
const VOLATILITY_WINDOW: i64 = 5;
const VOLATILITY_MIN_LOGS: usize = 4;
const VOLATILITY_JUMP: i32 = 2;
const VOLATILITY_MIN_JUMPS: usize = 2;
const ENGAGEMENT_PRIOR_MIN: usize = 4;
const ENGAGEMENT_CURRENT_MAX: usize = 1;
const OFF_HOURS_END: u32 = 5;
const STREAK_MILESTONES: &[i32] = &[3, 7, 14];
const WORD_USAGE_MIN_WORDS: usize = 5;
const WORD_USAGE_NEGATIVE_MAX: f64 = -0.3;
const WORD_USAGE_POSITIVE_MIN: f64 = 0.3;

// ────────────────────────────────────────────────────────────────────────────
// Signal model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordTone {
    Negative,
    Positive,
    Neutral,
}

/// What a signal is about. Determines its banner tag and base weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    MoodDrop,
    LowMood,
    StreakReset,
    NoJournalsYet,
    JournalGap,
    MoodSwing,
    MoodVolatility,
    DistressText,
    PositiveReflection,
    EngagementDrop,
    OffHoursActivity,
    StreakMilestone(i32),
    WordUsage(WordTone),
}

impl SignalKind {
    /// Banner tag; also the key of the user's banner history row.
    pub fn tag(&self) -> String {
        match self {
            SignalKind::MoodDrop => "mood_drop".to_string(),
            SignalKind::LowMood => "low_mood".to_string(),
            SignalKind::StreakReset => "streak_reset".to_string(),
            SignalKind::NoJournalsYet => "no_journals_yet".to_string(),
            SignalKind::JournalGap => "journal_gap".to_string(),
            SignalKind::MoodSwing => "mood_swing".to_string(),
            SignalKind::MoodVolatility => "mood_volatility".to_string(),
            SignalKind::DistressText => "distress_text".to_string(),
            SignalKind::PositiveReflection => "positive_reflection".to_string(),
            SignalKind::EngagementDrop => "engagement_drop".to_string(),
            SignalKind::OffHoursActivity => "off_hours_activity".to_string(),
            SignalKind::StreakMilestone(n) => format!("milestone-streak-{n}"),
            SignalKind::WordUsage(WordTone::Negative) => "word-usage-negative".to_string(),
            SignalKind::WordUsage(WordTone::Positive) => "word-usage-positive".to_string(),
            SignalKind::WordUsage(WordTone::Neutral) => "word-usage-neutral".to_string(),
        }
    }

    /// Base weight on a 1–5 scale.
    pub fn weight(&self) -> u8 {
        match self {
            SignalKind::NoJournalsYet | SignalKind::StreakMilestone(_) => 5,
            SignalKind::MoodDrop
            | SignalKind::DistressText
            | SignalKind::EngagementDrop
            | SignalKind::WordUsage(WordTone::Negative) => 4,
            SignalKind::LowMood
            | SignalKind::StreakReset
            | SignalKind::JournalGap
            | SignalKind::MoodSwing
            | SignalKind::MoodVolatility
            | SignalKind::PositiveReflection
            | SignalKind::WordUsage(WordTone::Positive) => 3,
            SignalKind::OffHoursActivity | SignalKind::WordUsage(WordTone::Neutral) => 2,
        }
    }
}

/// A nudge candidate. Built fresh per request and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub message: String,
    /// Boosts the banner score for journal-driven signals.
    pub journal_word_count: Option<u32>,
    /// Boosts the banner score for streak-driven signals.
    pub habit_streak: Option<u32>,
}

impl Signal {
    pub fn new(kind: SignalKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            journal_word_count: None,
            habit_streak: None,
        }
    }

    pub fn with_journal_word_count(mut self, count: u32) -> Self {
        self.journal_word_count = Some(count);
        self
    }

    pub fn with_habit_streak(mut self, streak: u32) -> Self {
        self.habit_streak = Some(streak);
        self
    }

    pub fn tag(&self) -> String {
        self.kind.tag()
    }

    pub fn weight(&self) -> u8 {
        self.kind.weight()
    }

    pub fn to_view(&self) -> SignalView {
        SignalView {
            tag: self.tag(),
            weight: self.weight(),
            message: self.message.clone(),
            journal_word_count: self.journal_word_count,
            habit_streak: self.habit_streak,
        }
    }
}

/// Wire shape of a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalView {
    pub tag: String,
    pub weight: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_word_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit_streak: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Detector registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    MoodDrop,
    LowMood,
    StreakReset,
    JournalGap,
    MoodSwing,
    MoodVolatility,
    DistressText,
    PositiveReflection,
    EngagementDrop,
    OffHoursActivity,
    StreakMilestone,
    WordUsage,
}

/// Detectors run on every recommendation request, in tie-break order.
pub const DEFAULT_DETECTORS: &[Detector] = &[
    Detector::MoodDrop,
    Detector::LowMood,
    Detector::StreakReset,
    Detector::JournalGap,
    Detector::MoodSwing,
    Detector::MoodVolatility,
    Detector::DistressText,
    Detector::PositiveReflection,
    Detector::EngagementDrop,
    Detector::OffHoursActivity,
    Detector::StreakMilestone,
];

/// The default set, plus the word-usage detector when enabled.
pub fn detector_set(include_word_usage: bool) -> Vec<Detector> {
    let mut detectors = DEFAULT_DETECTORS.to_vec();
    if include_word_usage {
        detectors.push(Detector::WordUsage);
    }
    detectors
}

impl Detector {
    pub fn name(&self) -> &'static str {
        match self {
            Detector::MoodDrop => "mood_drop",
            Detector::LowMood => "low_mood",
            Detector::StreakReset => "streak_reset",
            Detector::JournalGap => "journal_gap",
            Detector::MoodSwing => "mood_swing",
            Detector::MoodVolatility => "mood_volatility",
            Detector::DistressText => "distress_text",
            Detector::PositiveReflection => "positive_reflection",
            Detector::EngagementDrop => "engagement_drop",
            Detector::OffHoursActivity => "off_hours_activity",
            Detector::StreakMilestone => "streak_milestone",
            Detector::WordUsage => "word_usage",
        }
    }

    pub async fn run(
        &self,
        store: &dyn WellnessStore,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Signal>, AppError> {
        let signal = match self {
            Detector::MoodDrop => detect_mood_drop(&store.recent_mood_logs(user_id, 2).await?, now),
            Detector::LowMood => detect_low_mood(&store.recent_mood_logs(user_id, 1).await?, now),
            Detector::StreakReset => detect_streak_reset(&store.recent_mood_logs(user_id, 2).await?),
            Detector::JournalGap => {
                let count = store.journal_entry_count(user_id).await?;
                let latest = store.latest_journal_entry(user_id).await?;
                detect_journal_gap(count, latest.as_ref(), now)
            }
            Detector::MoodSwing => detect_mood_swing(&store.recent_mood_logs(user_id, 2).await?, now),
            Detector::MoodVolatility => {
                detect_mood_volatility(&store.recent_mood_logs(user_id, VOLATILITY_WINDOW).await?)
            }
            Detector::DistressText => {
                detect_distress_text(store.latest_journal_entry(user_id).await?.as_ref(), now)
            }
            Detector::PositiveReflection => {
                detect_positive_reflection(store.latest_journal_entry(user_id).await?.as_ref(), now)
            }
            Detector::EngagementDrop => {
                let logs = store
                    .mood_logs_since(user_id, now - Duration::days(14))
                    .await?;
                detect_engagement_drop(&logs, now)
            }
            Detector::OffHoursActivity => {
                let moods = store.recent_mood_logs(user_id, 1).await?;
                let journal = store.latest_journal_entry(user_id).await?;
                detect_off_hours_activity(moods.first(), journal.as_ref())
            }
            Detector::StreakMilestone => match store.user_profile(user_id).await? {
                Some(profile) => detect_streak_milestone(profile.current_streak),
                None => None,
            },
            Detector::WordUsage => {
                detect_word_usage_insights(&get_user_sentiment_profile(store, user_id).await?)
            }
        };
        Ok(signal)
    }
}

/// Runs `detectors` concurrently against one wall-clock `now`.
///
/// A detector that errors is logged and counts as "no signal"; the rest still
/// contribute. Output order follows `detectors`, not completion order.
pub async fn compute_signals(
    store: &dyn WellnessStore,
    user_id: Uuid,
    detectors: &[Detector],
) -> Vec<Signal> {
    let now = Utc::now();
    let results = join_all(detectors.iter().map(|d| d.run(store, user_id, now))).await;

    let mut signals = Vec::new();
    for (detector, result) in detectors.iter().zip(results) {
        match result {
            Ok(Some(signal)) => {
                debug!("Detector {} fired for user {user_id}", detector.name());
                signals.push(signal);
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Detector {} failed for user {user_id}, treating as no signal: {e}",
                detector.name()
            ),
        }
    }
    signals
}

// ────────────────────────────────────────────────────────────────────────────
// Classifiers (pure)
// ────────────────────────────────────────────────────────────────────────────

fn within(at: DateTime<Utc>, now: DateTime<Utc>, hours: i64) -> bool {
    now - at <= Duration::hours(hours)
}

/// `logs` newest first.
pub fn detect_mood_drop(logs: &[MoodLog], now: DateTime<Utc>) -> Option<Signal> {
    let [latest, previous, ..] = logs else {
        return None;
    };
    if previous.mood - latest.mood >= MOOD_DROP_THRESHOLD
        && within(latest.created_at, now, RECENT_MOOD_HOURS)
    {
        return Some(Signal::new(
            SignalKind::MoodDrop,
            "Your mood dipped since your last check-in. Want to write about what changed?",
        ));
    }
    None
}

pub fn detect_low_mood(logs: &[MoodLog], now: DateTime<Utc>) -> Option<Signal> {
    let latest = logs.first()?;
    if latest.mood <= LOW_MOOD_MAX && within(latest.created_at, now, RECENT_MOOD_HOURS) {
        return Some(Signal::new(
            SignalKind::LowMood,
            "Rough day? A short breathing exercise or a walk can help a little.",
        ));
    }
    None
}

pub fn detect_streak_reset(logs: &[MoodLog]) -> Option<Signal> {
    let [latest, previous, ..] = logs else {
        return None;
    };
    if latest.created_at - previous.created_at > Duration::days(STREAK_RESET_GAP_DAYS) {
        return Some(Signal::new(
            SignalKind::StreakReset,
            "Welcome back! Every check-in counts, so let's start a new streak.",
        ));
    }
    None
}

pub fn detect_journal_gap(
    entry_count: i64,
    latest: Option<&JournalEntry>,
    now: DateTime<Utc>,
) -> Option<Signal> {
    if entry_count == 0 {
        return Some(Signal::new(
            SignalKind::NoJournalsYet,
            "Try your first journal entry. Even a few sentences help you notice patterns.",
        ));
    }
    let latest = latest?;
    if now - latest.created_at >= Duration::days(JOURNAL_GAP_DAYS) {
        return Some(Signal::new(
            SignalKind::JournalGap,
            "It's been a few days since you journaled. How have things been?",
        ));
    }
    None
}

pub fn detect_mood_swing(logs: &[MoodLog], now: DateTime<Utc>) -> Option<Signal> {
    let [latest, previous, ..] = logs else {
        return None;
    };
    if latest.mood - previous.mood >= MOOD_SWING_THRESHOLD
        && within(latest.created_at, now, RECENT_MOOD_HOURS)
    {
        return Some(Signal::new(
            SignalKind::MoodSwing,
            "Big lift in your mood! Capture what went well while it's fresh.",
        ));
    }
    None
}

/// `logs` newest first; only the first five are considered.
pub fn detect_mood_volatility(logs: &[MoodLog]) -> Option<Signal> {
    let window = &logs[..logs.len().min(VOLATILITY_WINDOW as usize)];
    if window.len() < VOLATILITY_MIN_LOGS {
        return None;
    }
    let jumps = window
        .windows(2)
        .filter(|pair| (pair[0].mood - pair[1].mood).abs() >= VOLATILITY_JUMP)
        .count();
    if jumps >= VOLATILITY_MIN_JUMPS {
        return Some(Signal::new(
            SignalKind::MoodVolatility,
            "Your mood has been up and down lately. A steady routine might help.",
        ));
    }
    None
}

fn recent_journal(latest: Option<&JournalEntry>, now: DateTime<Utc>) -> Option<&JournalEntry> {
    latest.filter(|entry| within(entry.created_at, now, RECENT_JOURNAL_HOURS))
}

pub fn detect_distress_text(latest: Option<&JournalEntry>, now: DateTime<Utc>) -> Option<Signal> {
    let entry = recent_journal(latest, now)?;
    if !is_distressed(&entry.content) {
        return None;
    }
    Some(
        Signal::new(
            SignalKind::DistressText,
            "Your last entry sounded heavy. You don't have to carry it alone; reaching out can help.",
        )
        .with_journal_word_count(entry.word_count()),
    )
}

pub fn detect_positive_reflection(
    latest: Option<&JournalEntry>,
    now: DateTime<Utc>,
) -> Option<Signal> {
    let entry = recent_journal(latest, now)?;
    if !is_positive(&entry.content) {
        return None;
    }
    Some(
        Signal::new(
            SignalKind::PositiveReflection,
            "Lovely reflection. Consider sharing a bit of that gratitude with a friend.",
        )
        .with_journal_word_count(entry.word_count()),
    )
}

/// `logs` covers at least the last 14 days.
pub fn detect_engagement_drop(logs: &[MoodLog], now: DateTime<Utc>) -> Option<Signal> {
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);
    let current = logs.iter().filter(|l| l.created_at >= week_ago).count();
    let prior = logs
        .iter()
        .filter(|l| l.created_at >= two_weeks_ago && l.created_at < week_ago)
        .count();
    if prior >= ENGAGEMENT_PRIOR_MIN && current <= ENGAGEMENT_CURRENT_MAX {
        return Some(Signal::new(
            SignalKind::EngagementDrop,
            "We've missed you this week. A quick check-in takes ten seconds.",
        ));
    }
    None
}

/// Looks at whichever of the two is most recent; hours are UTC.
pub fn detect_off_hours_activity(
    latest_mood: Option<&MoodLog>,
    latest_journal: Option<&JournalEntry>,
) -> Option<Signal> {
    let latest = match (latest_mood, latest_journal) {
        (Some(m), Some(j)) => m.created_at.max(j.created_at),
        (Some(m), None) => m.created_at,
        (None, Some(j)) => j.created_at,
        (None, None) => return None,
    };
    if latest.hour() < OFF_HOURS_END {
        return Some(Signal::new(
            SignalKind::OffHoursActivity,
            "Up late? Rest matters too. Try winding down with a calm playlist.",
        ));
    }
    None
}

pub fn detect_streak_milestone(current_streak: i32) -> Option<Signal> {
    if !STREAK_MILESTONES.contains(&current_streak) {
        return None;
    }
    Some(
        Signal::new(
            SignalKind::StreakMilestone(current_streak),
            format!("{current_streak}-day streak! Keep the momentum going."),
        )
        .with_habit_streak(current_streak as u32),
    )
}

pub fn detect_word_usage_insights(profile: &SentimentProfile) -> Option<Signal> {
    if profile.total_words < WORD_USAGE_MIN_WORDS {
        return None;
    }
    let signal = if profile.score <= WORD_USAGE_NEGATIVE_MAX {
        Signal::new(
            SignalKind::WordUsage(WordTone::Negative),
            "Your recent words lean heavy. Try noting one small good thing each day.",
        )
    } else if profile.score >= WORD_USAGE_POSITIVE_MIN {
        Signal::new(
            SignalKind::WordUsage(WordTone::Positive),
            "Your journal has been full of positive words lately. Nice work!",
        )
    } else {
        Signal::new(
            SignalKind::WordUsage(WordTone::Neutral),
            "Your writing has been pretty balanced. Want to explore how you really feel?",
        )
    };
    Some(signal)
}
