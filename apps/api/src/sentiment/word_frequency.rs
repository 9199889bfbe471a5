//! Per-user word-frequency model, updated incrementally from journal text.
//!
//! Each distinct word gets one row per user. The row is created with a fixed
//! lexicon sentiment (+0.8 / -0.8 / 0) and only its count moves afterwards.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::insights::WordFrequency;
use crate::sentiment::lexicon;
use crate::store::{WellnessStore, WordUsageOutcome};

const MIN_WORD_LEN: usize = 3;
const POSITIVE_WORD_SENTIMENT: f64 = 0.8;
const NEGATIVE_WORD_SENTIMENT: f64 = -0.8;
const PROFILE_TOP_N: usize = 5;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z']+\b").expect("static regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordFrequencyUpdate {
    pub updated: usize,
    pub added: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopWord {
    pub word: String,
    pub frequency: i32,
    pub sentiment: f64,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordCount {
    pub word: String,
    pub frequency: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentProfile {
    /// Frequency-weighted mean sentiment over sentiment-bearing words.
    pub score: f64,
    pub top_positive: Vec<WordCount>,
    pub top_negative: Vec<WordCount>,
    /// Number of sentiment-bearing word rows.
    pub total_words: usize,
}

impl SentimentProfile {
    pub fn empty() -> Self {
        Self {
            score: 0.0,
            top_positive: Vec::new(),
            top_negative: Vec::new(),
            total_words: 0,
        }
    }
}

/// Lexicon sentiment assigned once, at row creation.
pub fn initial_sentiment(word: &str) -> f64 {
    if lexicon::is_positive(word) {
        POSITIVE_WORD_SENTIMENT
    } else if lexicon::is_negative(word) {
        NEGATIVE_WORD_SENTIMENT
    } else {
        0.0
    }
}

/// Counts trackable words: ASCII letters/apostrophes, lowercased, at least
/// three characters, not a stopword. Ordered by word for deterministic writes.
pub fn count_words(text: &str) -> BTreeMap<String, i32> {
    let mut counts = BTreeMap::new();
    for m in WORD.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if word.len() < MIN_WORD_LEN || lexicon::is_stopword(&word) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

pub async fn update_word_frequencies(
    store: &dyn WellnessStore,
    user_id: Uuid,
    text: &str,
    now: DateTime<Utc>,
) -> Result<WordFrequencyUpdate, AppError> {
    let counts = count_words(text);
    let mut result = WordFrequencyUpdate {
        updated: 0,
        added: 0,
        total: counts.len(),
    };

    for (word, occurrences) in &counts {
        match store
            .record_word_usage(user_id, word, *occurrences, initial_sentiment(word), now)
            .await?
        {
            WordUsageOutcome::Added => result.added += 1,
            WordUsageOutcome::Updated => result.updated += 1,
        }
    }

    debug!(
        "Word frequencies for user {user_id}: {} added, {} updated",
        result.added, result.updated
    );
    Ok(result)
}

/// Runs the update detached from the caller. Failures are logged and dropped;
/// the journal write that triggered it never sees them.
pub fn spawn_word_frequency_update(
    store: Arc<dyn WellnessStore>,
    user_id: Uuid,
    text: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = update_word_frequencies(store.as_ref(), user_id, &text, Utc::now()).await {
            warn!("Word frequency update failed for user {user_id}: {e}");
        }
    })
}

pub async fn get_top_words(
    store: &dyn WellnessStore,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<TopWord>, AppError> {
    let rows = store.top_words(user_id, limit).await?;
    Ok(rows
        .into_iter()
        .map(|row| TopWord {
            word: row.word,
            frequency: row.frequency,
            sentiment: row.sentiment,
            last_used: row.last_used,
        })
        .collect())
}

pub async fn get_user_sentiment_profile(
    store: &dyn WellnessStore,
    user_id: Uuid,
) -> Result<SentimentProfile, AppError> {
    let rows = store.sentiment_words(user_id).await?;
    Ok(build_sentiment_profile(&rows))
}

pub fn build_sentiment_profile(rows: &[WordFrequency]) -> SentimentProfile {
    let bearing: Vec<&WordFrequency> = rows.iter().filter(|r| r.sentiment != 0.0).collect();
    let total_frequency: i64 = bearing.iter().map(|r| r.frequency as i64).sum();
    if bearing.is_empty() || total_frequency == 0 {
        return SentimentProfile::empty();
    }

    let weighted: f64 = bearing
        .iter()
        .map(|r| r.frequency as f64 * r.sentiment)
        .sum();

    let top = |positive: bool| -> Vec<WordCount> {
        let mut picked: Vec<&&WordFrequency> = bearing
            .iter()
            .filter(|r| (r.sentiment > 0.0) == positive)
            .collect();
        picked.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.word.cmp(&b.word)));
        picked
            .into_iter()
            .take(PROFILE_TOP_N)
            .map(|r| WordCount {
                word: r.word.clone(),
                frequency: r.frequency,
            })
            .collect()
    };

    SentimentProfile {
        score: weighted / total_frequency as f64,
        top_positive: top(true),
        top_negative: top(false),
        total_words: bearing.len(),
    }
}
