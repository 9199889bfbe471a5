use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The three content types that can appear in a friend's feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Mood,
    Journal,
    Habit,
}

/// An undirected friendship stored as an ordered pair (`user_a < user_b`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Connection {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
impl Connection {
    /// Builds a connection in canonical order regardless of argument order.
    pub fn between(first: Uuid, second: Uuid, created_at: DateTime<Utc>) -> Self {
        let (user_a, user_b) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Self {
            user_a,
            user_b,
            created_at,
        }
    }

    /// The other side of the connection, if `user_id` is part of it.
    pub fn other(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_a == user_id {
            Some(self.user_b)
        } else if self.user_b == user_id {
            Some(self.user_a)
        } else {
            None
        }
    }
}

/// Per-user sharing preferences. A user with no row is fully visible.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareSettings {
    pub user_id: Uuid,
    pub sharing_enabled: bool,
    pub share_mood: bool,
    pub share_journal: bool,
    pub share_habits: bool,
}

impl ShareSettings {
    #[cfg(test)]
    pub fn fully_visible(user_id: Uuid) -> Self {
        Self {
            user_id,
            sharing_enabled: true,
            share_mood: true,
            share_journal: true,
            share_habits: true,
        }
    }

    /// Global switch first, then the per-type toggle.
    pub fn allows(&self, kind: ContentKind) -> bool {
        if !self.sharing_enabled {
            return false;
        }
        match kind {
            ContentKind::Mood => self.share_mood,
            ContentKind::Journal => self.share_journal,
            ContentKind::Habit => self.share_habits,
        }
    }
}
