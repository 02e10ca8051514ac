use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::engine::level::DifficultyLevel;
use crate::engine::predictor::{DifficultyPredictor, Features, NullPredictor};
use crate::session::tracker::{DEFAULT_WINDOW, MIN_SIGNAL_ATTEMPTS, PerformanceTracker};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Increase,
    Maintain,
    Decrease,
}

impl Transition {
    /// Moves at most one level, clamped to Easy..=Hard.
    pub fn apply(self, level: DifficultyLevel) -> DifficultyLevel {
        match self {
            Transition::Increase => level.step_up(),
            Transition::Maintain => level,
            Transition::Decrease => level.step_down(),
        }
    }

    pub fn between(from: DifficultyLevel, to: DifficultyLevel) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Transition::Increase,
            std::cmp::Ordering::Equal => Transition::Maintain,
            std::cmp::Ordering::Less => Transition::Decrease,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub window: usize,
    pub high_accuracy: f64,
    pub stable_accuracy: f64,
    pub fast_time_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            high_accuracy: 0.80,
            stable_accuracy: 0.67,
            fast_time_ms: 8000.0,
        }
    }
}

impl Thresholds {
    pub fn from_config(config: &Config) -> Self {
        Self {
            window: config.window_size,
            high_accuracy: config.high_accuracy,
            stable_accuracy: config.stable_accuracy,
            fast_time_ms: config.fast_time_ms,
        }
    }

    /// The fixed rule. Time only gates increases; it never causes a decrease.
    pub fn classify(&self, accuracy: f64, avg_time_ms: f64) -> Transition {
        if accuracy >= self.high_accuracy && avg_time_ms < self.fast_time_ms {
            Transition::Increase
        } else if accuracy >= self.stable_accuracy {
            Transition::Maintain
        } else {
            Transition::Decrease
        }
    }
}

/// Human-readable feedback on the recent window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Percentage, 0-100.
    pub accuracy: f64,
    pub avg_time_ms: f64,
    pub verdict: String,
    pub recommendation: String,
}

pub struct AdaptiveEngine {
    thresholds: Thresholds,
    predictor: Arc<dyn DifficultyPredictor>,
    confidence_threshold: f64,
}

impl Default for AdaptiveEngine {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl AdaptiveEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            predictor: Arc::new(NullPredictor),
            confidence_threshold: 0.7,
        }
    }

    pub fn with_predictor(
        mut self,
        predictor: Arc<dyn DifficultyPredictor>,
        confidence_threshold: f64,
    ) -> Self {
        self.predictor = predictor;
        self.confidence_threshold = confidence_threshold;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn decide(&self, current: DifficultyLevel, tracker: &PerformanceTracker) -> DifficultyLevel {
        self.decide_transition(current, tracker).apply(current)
    }

    pub fn decide_transition(
        &self,
        current: DifficultyLevel,
        tracker: &PerformanceTracker,
    ) -> Transition {
        let window = self.thresholds.window;
        if tracker.len() < MIN_SIGNAL_ATTEMPTS {
            return Transition::Maintain;
        }
        let (Some(accuracy), Some(avg_time)) = (
            tracker.windowed_accuracy(window),
            tracker.windowed_average_time(window),
        ) else {
            return Transition::Maintain;
        };

        let features = Features::from_tracker(tracker, current, window);
        if let Some(prediction) = self.predictor.predict(&features) {
            if prediction.confidence > self.confidence_threshold {
                debug!(?prediction, %current, "using predictor decision");
                return prediction.transition;
            }
        }

        let transition = self.thresholds.classify(accuracy, avg_time);
        debug!(accuracy, avg_time, ?transition, %current, "rule-based decision");
        transition
    }

    pub fn assess(&self, tracker: &PerformanceTracker) -> Assessment {
        let window = self.thresholds.window;
        if tracker.is_empty() {
            return Assessment {
                accuracy: 0.0,
                avg_time_ms: 0.0,
                verdict: "Not enough data".to_string(),
                recommendation: "Continue practicing".to_string(),
            };
        }

        let recent = tracker.recent_window(window);
        let correct = recent.iter().filter(|a| a.correct).count();
        let accuracy = correct as f64 / recent.len() as f64;
        let avg_time = tracker.windowed_average_time(window).unwrap_or(0.0);

        let (verdict, recommendation) = match self.thresholds.classify(accuracy, avg_time) {
            Transition::Increase => (
                "Excellent! You're mastering this level.",
                "Ready for more challenging problems",
            ),
            Transition::Maintain => (
                "Good progress! Keep it up.",
                "Continue at this level to build confidence",
            ),
            Transition::Decrease => (
                "Keep practicing - you're learning!",
                "Let's try some easier problems",
            ),
        };

        Assessment {
            accuracy: accuracy * 100.0,
            avg_time_ms: avg_time,
            verdict: verdict.to_string(),
            recommendation: recommendation.to_string(),
        }
    }
}
