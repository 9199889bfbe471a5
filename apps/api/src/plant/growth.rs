//! Engagement-gated plant growth: one level per calendar day at most, only
//! while the user has been active on enough days this week.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::plant::PlantGrowth;
use crate::store::WellnessStore;

pub const ENGAGEMENT_WINDOW_DAYS: i64 = 7;
pub const GROWTH_THRESHOLD: f64 = 0.65;
/// One mood day plus one journal day for each day of the window.
const MAX_ACTIVITY_DAYS: usize = 2 * ENGAGEMENT_WINDOW_DAYS as usize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthOutcome {
    pub grown: bool,
    pub level: i32,
    /// Further distinct activity-days needed to reach the threshold.
    pub logs_remaining: usize,
}

fn distinct_days(timestamps: impl Iterator<Item = DateTime<Utc>>) -> usize {
    timestamps
        .map(|t| t.date_naive())
        .collect::<HashSet<NaiveDate>>()
        .len()
        .min(ENGAGEMENT_WINDOW_DAYS as usize)
}

pub fn engagement_ratio(activity_days: usize) -> f64 {
    activity_days.min(MAX_ACTIVITY_DAYS) as f64 / MAX_ACTIVITY_DAYS as f64
}

pub fn logs_remaining(activity_days: usize) -> usize {
    let needed = (GROWTH_THRESHOLD * MAX_ACTIVITY_DAYS as f64).ceil() as usize;
    needed.saturating_sub(activity_days)
}

pub async fn check_and_grow_plant(
    store: &dyn WellnessStore,
    user_id: Uuid,
) -> Result<GrowthOutcome, AppError> {
    check_and_grow_plant_at(store, user_id, Utc::now()).await
}

pub async fn check_and_grow_plant_at(
    store: &dyn WellnessStore,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<GrowthOutcome, AppError> {
    let since = now - Duration::days(ENGAGEMENT_WINDOW_DAYS);
    let moods = store.mood_logs_since(user_id, since).await?;
    let journals = store.journal_entries_since(user_id, since).await?;
    let activity_days = distinct_days(moods.iter().map(|m| m.created_at))
        + distinct_days(journals.iter().map(|j| j.created_at));

    let mut plant = store
        .plant_growth(user_id)
        .await?
        .unwrap_or_else(|| PlantGrowth::seed(user_id));

    let mut grown = engagement_ratio(activity_days) >= GROWTH_THRESHOLD
        && plant.advance_level(now.date_naive());
    if grown {
        grown = store.save_plant_growth(&plant).await?;
        if grown {
            info!("Plant for user {user_id} grew to level {}", plant.level);
        } else if let Some(current) = store.plant_growth(user_id).await? {
            debug!("Plant for user {user_id} already grew today");
            plant = current;
        }
    }

    Ok(GrowthOutcome {
        grown,
        level: plant.level,
        logs_remaining: logs_remaining(activity_days),
    })
}
