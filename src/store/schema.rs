use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::level::DifficultyLevel;
use crate::engine::rating::{DEFAULT_RATING, RatingUpdate};
use crate::session::result::SessionSummary;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    #[serde(default)]
    pub player_name: String,
    #[serde(default = "default_rating")]
    pub rating: i32,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub last_level: Option<DifficultyLevel>,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

fn default_rating() -> i32 {
    DEFAULT_RATING
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            player_name: String::new(),
            rating: DEFAULT_RATING,
            games_played: 0,
            best_score: 0,
            last_level: None,
            last_played: None,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Utc>,
    pub player_name: String,
    pub summary: SessionSummary,
    pub final_level: DifficultyLevel,
    pub rating: RatingUpdate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionRecord>,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}
