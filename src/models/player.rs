use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::fatigue::MAX_FATIGUE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: String,
    pub click_count: i64,
    pub fatigue_level: i64,
    pub experience_level: i64,
    pub experience_amount: i64,
    pub last_update_time: i64,
    pub created_at: i64,
}

impl Player {
    pub fn new(player_id: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            player_id,
            click_count: 0,
            fatigue_level: MAX_FATIGUE,
            experience_level: 0,
            experience_amount: 0,
            last_update_time: now,
            created_at: now,
        }
    }

    /// When fatigue was last brought up to date
    pub fn last_updated(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.last_update_time, 0).unwrap_or_default()
    }
}

/// The gameplay fields a client overwrites on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub click_count: i64,
    pub fatigue_level: i64,
    pub experience_level: i64,
    pub experience_amount: i64,
}

/// A subset of player fields to write. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerUpdate {
    pub click_count: Option<i64>,
    pub fatigue_level: Option<i64>,
    pub experience_level: Option<i64>,
    pub experience_amount: Option<i64>,
    pub last_update_time: Option<i64>,
}

impl PlayerUpdate {
    /// The update written back after fatigue recovery
    pub fn fatigue(fatigue_level: i64, at: DateTime<Utc>) -> Self {
        Self {
            fatigue_level: Some(fatigue_level),
            last_update_time: Some(at.timestamp()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.click_count.is_none()
            && self.fatigue_level.is_none()
            && self.experience_level.is_none()
            && self.experience_amount.is_none()
            && self.last_update_time.is_none()
    }
}

/// Gameplay fields a client may overwrite individually. Missing keys are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    pub click_count: Option<i64>,
    pub fatigue_level: Option<i64>,
    pub experience_level: Option<i64>,
    pub experience_amount: Option<i64>,
}
