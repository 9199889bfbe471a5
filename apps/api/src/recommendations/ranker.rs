//! Turns signals into scored banners, and records what the user saw or dismissed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::insights::BannerHistory;
use crate::recommendations::scoring::{calculate_banner_score, round2, BannerScoreInputs};
use crate::recommendations::signals::{compute_signals, Detector, Signal};
use crate::store::WellnessStore;

const SEEN_RECENTLY_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedBanner {
    pub tag: String,
    pub message: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct HistoryView {
    days_since_dismiss: Option<f64>,
    seen_recently: bool,
}

fn history_by_tag(history: &[BannerHistory], now: DateTime<Utc>) -> HashMap<&str, HistoryView> {
    history
        .iter()
        .map(|h| {
            (
                h.banner_tag.as_str(),
                HistoryView {
                    days_since_dismiss: h.days_since_dismiss(now),
                    seen_recently: h.seen_recently(now),
                },
            )
        })
        .collect()
}

/// Scores each signal against its banner history. Zero scores are dropped;
/// equal scores keep signal order.
pub fn rank_signals(
    signals: &[Signal],
    history: &[BannerHistory],
    now: DateTime<Utc>,
) -> Vec<RankedBanner> {
    let views = history_by_tag(history, now);

    let mut ranked: Vec<RankedBanner> = signals
        .iter()
        .filter_map(|signal| {
            let tag = signal.tag();
            let view = views.get(tag.as_str()).copied().unwrap_or_default();
            let mut score = calculate_banner_score(&BannerScoreInputs {
                base_weight: signal.weight(),
                journal_word_count: signal.journal_word_count,
                habit_streak: signal.habit_streak,
                days_since_dismiss: view.days_since_dismiss,
            });
            if view.seen_recently {
                score = round2(score * SEEN_RECENTLY_FACTOR);
            }
            (score > 0.0).then(|| RankedBanner {
                tag,
                message: signal.message.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Computes, ranks, and marks the top banner as seen.
pub async fn get_ranked_banners(
    store: &dyn WellnessStore,
    user_id: Uuid,
    detectors: &[Detector],
) -> Result<Vec<RankedBanner>, AppError> {
    let signals = compute_signals(store, user_id, detectors).await;
    let history = store.banner_history(user_id).await?;
    let now = Utc::now();
    let ranked = rank_signals(&signals, &history, now);

    if let Some(top) = ranked.first() {
        let mut entry = history
            .iter()
            .find(|h| h.banner_tag == top.tag)
            .cloned()
            .unwrap_or_else(|| BannerHistory::new(user_id, &top.tag));
        entry.record_seen(now);
        store.save_banner_history(&entry).await?;
        debug!("Banner {} shown to user {user_id} (score {})", top.tag, top.score);
    }

    Ok(ranked)
}

pub async fn dismiss_banner(
    store: &dyn WellnessStore,
    user_id: Uuid,
    tag: &str,
) -> Result<(), AppError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(AppError::Validation("tag must not be empty".to_string()));
    }

    let history = store.banner_history(user_id).await?;
    let mut entry = history
        .into_iter()
        .find(|h| h.banner_tag == tag)
        .unwrap_or_else(|| BannerHistory::new(user_id, tag));
    entry.record_dismissed(Utc::now());
    store.save_banner_history(&entry).await?;

    info!("User {user_id} dismissed banner {tag}");
    Ok(())
}
