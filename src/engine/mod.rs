pub mod adaptive;
pub mod level;
pub mod predictor;
pub mod rating;

pub use adaptive::{AdaptiveEngine, Thresholds, Transition};
pub use level::{DifficultyLevel, LevelConfig, LevelTable};
