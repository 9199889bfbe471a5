use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::social::ContentKind;

/// One row of the unioned friends' activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ContentKind,
    pub title: Option<String>,
    pub body: Option<String>,
    pub mood: Option<i32>,
    pub created_at: DateTime<Utc>,
}
