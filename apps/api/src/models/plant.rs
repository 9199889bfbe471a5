use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_PLANT_LEVEL: i32 = 1;
pub const MAX_PLANT_LEVEL: i32 = 6;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlantGrowth {
    pub user_id: Uuid,
    pub level: i32,
    pub last_growth_date: Option<NaiveDate>,
}

impl PlantGrowth {
    pub fn seed(user_id: Uuid) -> Self {
        Self {
            user_id,
            level: MIN_PLANT_LEVEL,
            last_growth_date: None,
        }
    }

    pub fn grew_on(&self, day: NaiveDate) -> bool {
        self.last_growth_date == Some(day)
    }

    pub fn is_fully_grown(&self) -> bool {
        self.level >= MAX_PLANT_LEVEL
    }

    /// Moves up exactly one level. No-op (returns false) if the plant already
    /// grew on `today` or is at the top level.
    pub fn advance_level(&mut self, today: NaiveDate) -> bool {
        if self.grew_on(today) || self.is_fully_grown() {
            return false;
        }
        self.level = (self.level + 1).min(MAX_PLANT_LEVEL);
        self.last_growth_date = Some(today);
        true
    }
}
