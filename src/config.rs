use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::level::{DifficultyLevel, LevelTable, Operation, Pattern};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{level} range {min}-{max} is invalid (need 1 <= min < max)")]
    InvalidRange {
        level: DifficultyLevel,
        min: u32,
        max: u32,
    },
    #[error("{level} max {max} is above the limit of {limit}")]
    RangeTooLarge {
        level: DifficultyLevel,
        max: u32,
        limit: u32,
    },
    #[error("{0} has no operations")]
    NoOperations(DifficultyLevel),
    #[error("{level} allows {count} operands (need 2-4, or 3-4 with order of operations)")]
    OperandCount { level: DifficultyLevel, count: usize },
    #[error("{level} simple puzzle probability {value} is outside 0-1")]
    Probability { level: DifficultyLevel, value: f64 },
    #[error("{0} enables order of operations but lists no patterns")]
    NoPatterns(DifficultyLevel),
    #[error("{level} pattern {pattern:?} needs operation {operation:?}")]
    PatternNeedsOperation {
        level: DifficultyLevel,
        pattern: Pattern,
        operation: Operation,
    },
    #[error("session length must be at least 1")]
    EmptySession,
    #[error("window size must be at least 2")]
    WindowTooSmall,
    #[error("accuracy thresholds must satisfy 0 <= stable ({stable}) <= high ({high}) <= 1")]
    Thresholds { stable: f64, high: f64 },
    #[error("predictor confidence {0} is outside 0-1")]
    Confidence(f64),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default = "default_session_length")]
    pub session_length: usize,
    #[serde(default = "default_starting_level")]
    pub starting_level: DifficultyLevel,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: f64,
    #[serde(default = "default_stable_accuracy")]
    pub stable_accuracy: f64,
    #[serde(default = "default_fast_time_ms")]
    pub fast_time_ms: f64,
    #[serde(default)]
    pub predictor_model: Option<String>,
    #[serde(default = "default_predictor_confidence")]
    pub predictor_confidence: f64,
    #[serde(default = "default_predictor_init_timeout_ms")]
    pub predictor_init_timeout_ms: u64,
    #[serde(default = "default_constrained_predictor_init_timeout_ms")]
    pub constrained_predictor_init_timeout_ms: u64,
    #[serde(default)]
    pub constrained_device: bool,
    #[serde(default)]
    pub levels: LevelTable,
}

fn default_theme() -> String {
    "chalkboard".to_string()
}
fn default_session_length() -> usize {
    10
}
fn default_starting_level() -> DifficultyLevel {
    DifficultyLevel::Medium
}
fn default_window_size() -> usize {
    3
}
fn default_high_accuracy() -> f64 {
    0.80
}
fn default_stable_accuracy() -> f64 {
    0.67
}
fn default_fast_time_ms() -> f64 {
    8000.0
}
fn default_predictor_confidence() -> f64 {
    0.7
}
fn default_predictor_init_timeout_ms() -> u64 {
    3000
}
fn default_constrained_predictor_init_timeout_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            player_name: String::new(),
            session_length: default_session_length(),
            starting_level: default_starting_level(),
            window_size: default_window_size(),
            high_accuracy: default_high_accuracy(),
            stable_accuracy: default_stable_accuracy(),
            fast_time_ms: default_fast_time_ms(),
            predictor_model: None,
            predictor_confidence: default_predictor_confidence(),
            predictor_init_timeout_ms: default_predictor_init_timeout_ms(),
            constrained_predictor_init_timeout_ms: default_constrained_predictor_init_timeout_ms(),
            constrained_device: false,
            levels: LevelTable::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathadv")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_length == 0 {
            return Err(ConfigError::EmptySession);
        }
        if self.window_size < 2 {
            return Err(ConfigError::WindowTooSmall);
        }
        let ordered = 0.0 <= self.stable_accuracy
            && self.stable_accuracy <= self.high_accuracy
            && self.high_accuracy <= 1.0;
        if !ordered {
            return Err(ConfigError::Thresholds {
                stable: self.stable_accuracy,
                high: self.high_accuracy,
            });
        }
        if !(0.0..=1.0).contains(&self.predictor_confidence) {
            return Err(ConfigError::Confidence(self.predictor_confidence));
        }
        self.levels.validate()
    }

    /// How long predictor initialization may run before falling back to rules.
    pub fn predictor_init_timeout(&self) -> Duration {
        let ms = if self.constrained_device {
            self.constrained_predictor_init_timeout_ms
        } else {
            self.predictor_init_timeout_ms
        };
        Duration::from_millis(ms)
    }
}
