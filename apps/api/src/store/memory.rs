//! In-memory `WellnessStore` for async tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feed::FeedItem;
use crate::models::habit::Habit;
use crate::models::insights::{BannerHistory, WordFrequency};
use crate::models::journal::JournalEntry;
use crate::models::mood::MoodLog;
use crate::models::plant::PlantGrowth;
use crate::models::social::{Connection, ShareSettings};
use crate::models::user::UserProfile;
use crate::store::{MutualCount, WellnessStore, WordUsageOutcome};

#[derive(Default)]
pub struct MemoryData {
    pub users: Vec<UserProfile>,
    pub mood_logs: Vec<MoodLog>,
    pub journal_entries: Vec<JournalEntry>,
    pub habits: Vec<Habit>,
    pub connections: Vec<Connection>,
    pub share_settings: Vec<ShareSettings>,
    pub feed_items: Vec<FeedItem>,
    pub words: Vec<WordFrequency>,
    pub banners: Vec<BannerHistory>,
    pub plants: HashMap<Uuid, PlantGrowth>,
}

/// Parks the next call to one store method until released.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Resolves once a call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub data: Mutex<MemoryData>,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call to the named method fail with an internal error.
    pub fn fail_on(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    /// Parks the next call to the named method. Later calls pass straight
    /// through. `feed_items` parks after reading its rows and
    /// `save_plant_growth` parks before writing.
    pub fn hold(&self, method: &'static str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates.lock().unwrap().insert(method, gate.clone());
        gate
    }

    pub fn calls(&self, method: &'static str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MemoryData) -> R) -> R {
        f(&mut self.data.lock().unwrap())
    }

    fn check(&self, method: &'static str) -> Result<(), AppError> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(method) {
            return Err(AppError::Internal(anyhow::anyhow!("{method} unavailable")));
        }
        Ok(())
    }

    async fn pause(&self, method: &'static str) {
        let gate = self.gates.lock().unwrap().remove(method);
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    fn connected(data: &MemoryData, user_id: Uuid) -> Vec<Uuid> {
        data.connections
            .iter()
            .filter_map(|c| c.other(user_id))
            .collect()
    }
}

#[async_trait]
impl WellnessStore for MemoryStore {
    async fn recent_mood_logs(&self, user_id: Uuid, limit: i64) -> Result<Vec<MoodLog>, AppError> {
        self.check("recent_mood_logs")?;
        let mut logs: Vec<MoodLog> = self.with(|d| {
            d.mood_logs
                .iter()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect()
        });
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn mood_logs_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodLog>, AppError> {
        self.check("mood_logs_since")?;
        let mut logs: Vec<MoodLog> = self.with(|d| {
            d.mood_logs
                .iter()
                .filter(|m| m.user_id == user_id && m.created_at >= since)
                .cloned()
                .collect()
        });
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    async fn latest_journal_entry(&self, user_id: Uuid) -> Result<Option<JournalEntry>, AppError> {
        self.check("latest_journal_entry")?;
        Ok(self.with(|d| {
            d.journal_entries
                .iter()
                .filter(|j| j.user_id == user_id)
                .max_by_key(|j| j.created_at)
                .cloned()
        }))
    }

    async fn journal_entry_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.check("journal_entry_count")?;
        Ok(self.with(|d| d.journal_entries.iter().filter(|j| j.user_id == user_id).count() as i64))
    }

    async fn journal_entries_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<JournalEntry>, AppError> {
        self.check("journal_entries_since")?;
        let mut entries: Vec<JournalEntry> = self.with(|d| {
            d.journal_entries
                .iter()
                .filter(|j| j.user_id == user_id && j.created_at >= since)
                .cloned()
                .collect()
        });
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        self.check("user_profile")?;
        Ok(self.with(|d| d.users.iter().find(|u| u.id == user_id).cloned()))
    }

    async fn user_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<UserProfile>, AppError> {
        self.check("user_profiles")?;
        Ok(self.with(|d| {
            d.users
                .iter()
                .filter(|u| user_ids.contains(&u.id))
                .cloned()
                .collect()
        }))
    }

    async fn habits(&self, user_id: Uuid) -> Result<Vec<Habit>, AppError> {
        self.check("habits")?;
        Ok(self.with(|d| {
            d.habits
                .iter()
                .filter(|h| h.user_id == user_id)
                .cloned()
                .collect()
        }))
    }

    async fn connection_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        self.check("connection_ids")?;
        Ok(self.with(|d| Self::connected(d, user_id)))
    }

    async fn mutual_connection_count(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<i64, AppError> {
        self.check("mutual_connection_count")?;
        Ok(self.with(|d| {
            let mine: HashSet<Uuid> = Self::connected(d, user_id).into_iter().collect();
            Self::connected(d, other_id)
                .iter()
                .filter(|id| mine.contains(id))
                .count() as i64
        }))
    }

    async fn candidate_user_ids(
        &self,
        user_id: Uuid,
        exclude: &[Uuid],
        max_candidates: i64,
    ) -> Result<Vec<Uuid>, AppError> {
        self.check("candidate_user_ids")?;
        Ok(self.with(|d| {
            let mine = Self::connected(d, user_id);
            d.users
                .iter()
                .map(|u| u.id)
                .filter(|id| *id != user_id && !exclude.contains(id) && !mine.contains(id))
                .take(max_candidates.max(0) as usize)
                .collect()
        }))
    }

    async fn friends_of_friends(
        &self,
        user_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MutualCount>, AppError> {
        self.check("friends_of_friends")?;
        let mut counts: Vec<MutualCount> = self.with(|d| {
            let mine = Self::connected(d, user_id);
            let mut tally: HashMap<Uuid, i64> = HashMap::new();
            for friend in &mine {
                for candidate in Self::connected(d, *friend) {
                    if candidate != user_id
                        && !mine.contains(&candidate)
                        && !exclude.contains(&candidate)
                    {
                        *tally.entry(candidate).or_default() += 1;
                    }
                }
            }
            tally
                .into_iter()
                .map(|(user_id, mutual_count)| MutualCount {
                    user_id,
                    mutual_count,
                })
                .collect()
        });
        counts.sort_by(|a, b| {
            b.mutual_count
                .cmp(&a.mutual_count)
                .then(a.user_id.cmp(&b.user_id))
        });
        counts.truncate(limit.max(0) as usize);
        Ok(counts)
    }

    async fn share_settings(&self, user_ids: &[Uuid]) -> Result<Vec<ShareSettings>, AppError> {
        self.check("share_settings")?;
        Ok(self.with(|d| {
            d.share_settings
                .iter()
                .filter(|s| user_ids.contains(&s.user_id))
                .cloned()
                .collect()
        }))
    }

    async fn feed_items(
        &self,
        author_ids: &[Uuid],
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedItem>, AppError> {
        self.check("feed_items")?;
        let mut items: Vec<FeedItem> = self.with(|d| {
            d.feed_items
                .iter()
                .filter(|i| author_ids.contains(&i.user_id))
                .filter(|i| before.map(|b| i.created_at < b).unwrap_or(true))
                .cloned()
                .collect()
        });
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit.max(0) as usize);
        self.pause("feed_items").await;
        Ok(items)
    }

    async fn record_word_usage(
        &self,
        user_id: Uuid,
        word: &str,
        occurrences: i32,
        sentiment: f64,
        now: DateTime<Utc>,
    ) -> Result<WordUsageOutcome, AppError> {
        self.check("record_word_usage")?;
        Ok(self.with(|d| {
            let existing = d
                .words
                .iter()
                .position(|w| w.user_id == user_id && w.word == word);
            match existing {
                Some(idx) => {
                    d.words[idx].increment_frequency(occurrences, now);
                    WordUsageOutcome::Updated
                }
                None => {
                    d.words.push(WordFrequency::first_use(
                        user_id,
                        word,
                        occurrences,
                        sentiment,
                        now,
                    ));
                    WordUsageOutcome::Added
                }
            }
        }))
    }

    async fn top_words(&self, user_id: Uuid, limit: i64) -> Result<Vec<WordFrequency>, AppError> {
        self.check("top_words")?;
        let mut words: Vec<WordFrequency> = self.with(|d| {
            d.words
                .iter()
                .filter(|w| w.user_id == user_id)
                .cloned()
                .collect()
        });
        words.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.word.cmp(&b.word)));
        words.truncate(limit.max(0) as usize);
        Ok(words)
    }

    async fn sentiment_words(&self, user_id: Uuid) -> Result<Vec<WordFrequency>, AppError> {
        self.check("sentiment_words")?;
        let mut words: Vec<WordFrequency> = self.with(|d| {
            d.words
                .iter()
                .filter(|w| w.user_id == user_id && w.sentiment != 0.0)
                .cloned()
                .collect()
        });
        words.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.word.cmp(&b.word)));
        Ok(words)
    }

    async fn banner_history(&self, user_id: Uuid) -> Result<Vec<BannerHistory>, AppError> {
        self.check("banner_history")?;
        Ok(self.with(|d| {
            d.banners
                .iter()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect()
        }))
    }

    async fn save_banner_history(&self, history: &BannerHistory) -> Result<(), AppError> {
        self.check("save_banner_history")?;
        self.with(|d| {
            let existing = d
                .banners
                .iter()
                .position(|b| b.user_id == history.user_id && b.banner_tag == history.banner_tag);
            match existing {
                Some(idx) => {
                    let row = &mut d.banners[idx];
                    row.seen_at = history.seen_at.or(row.seen_at);
                    row.dismissed_at = history.dismissed_at.or(row.dismissed_at);
                }
                None => d.banners.push(history.clone()),
            }
        });
        Ok(())
    }

    async fn plant_growth(&self, user_id: Uuid) -> Result<Option<PlantGrowth>, AppError> {
        self.check("plant_growth")?;
        Ok(self.with(|d| d.plants.get(&user_id).cloned()))
    }

    async fn save_plant_growth(&self, plant: &PlantGrowth) -> Result<bool, AppError> {
        self.check("save_plant_growth")?;
        self.pause("save_plant_growth").await;
        Ok(self.with(|d| match d.plants.get(&plant.user_id) {
            Some(current) if current.last_growth_date == plant.last_growth_date => false,
            _ => {
                d.plants.insert(plant.user_id, plant.clone());
                true
            }
        }))
    }
}
