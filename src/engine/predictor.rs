//! Optional learned advisor for difficulty changes.
//!
//! The adaptive engine only consults a predictor when one is attached and
//! confident; every failure here degrades to the fixed rule.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::engine::adaptive::Transition;
use crate::engine::level::DifficultyLevel;
use crate::session::tracker::PerformanceTracker;

/// Response time that maps to 1.0 after normalization.
pub const TIME_NORMALIZER_MS: f64 = 15_000.0;
const STREAK_CAP: usize = 10;
const ATTEMPT_CAP: usize = 20;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model contains non-finite parameters")]
    NonFinite,
    #[error("initialization did not finish within {0:?}")]
    Timeout(Duration),
    #[error("initialization worker exited without a result")]
    Disconnected,
}

/// Normalized inputs, each in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Features {
    pub accuracy: f64,
    pub normalized_time: f64,
    pub normalized_level: f64,
    pub streak: f64,
    pub normalized_attempts: f64,
}

impl Features {
    pub fn from_tracker(
        tracker: &PerformanceTracker,
        current: DifficultyLevel,
        window: usize,
    ) -> Self {
        let accuracy = tracker.windowed_accuracy(window).unwrap_or(0.0);
        let avg_time = tracker.windowed_average_time(window).unwrap_or(0.0);
        Self {
            accuracy,
            normalized_time: (avg_time / TIME_NORMALIZER_MS).clamp(0.0, 1.0),
            normalized_level: current.index() as f64 / 2.0,
            streak: tracker.correct_streak().min(STREAK_CAP) as f64 / STREAK_CAP as f64,
            normalized_attempts: tracker.len().min(ATTEMPT_CAP) as f64 / ATTEMPT_CAP as f64,
        }
    }

    pub fn to_vector(&self) -> [f64; 5] {
        [
            self.accuracy,
            self.normalized_time,
            self.normalized_level,
            self.streak,
            self.normalized_attempts,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub transition: Transition,
    pub confidence: f64,
}

pub trait DifficultyPredictor: Send + Sync {
    /// `None` means the predictor has nothing to say for these features.
    fn predict(&self, features: &Features) -> Option<Prediction>;
}

/// Stand-in used when no model is configured or loading failed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPredictor;

impl DifficultyPredictor for NullPredictor {
    fn predict(&self, _features: &Features) -> Option<Prediction> {
        None
    }
}

/// Softmax over three linear scores. Rows are ordered decrease, maintain,
/// increase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictor {
    pub weights: [[f64; 5]; 3],
    pub bias: [f64; 3],
}

const OUTCOMES: [Transition; 3] = [
    Transition::Decrease,
    Transition::Maintain,
    Transition::Increase,
];

impl LinearPredictor {
    pub fn from_json(json: &str) -> Result<Self, PredictorError> {
        let model: LinearPredictor = serde_json::from_str(json)?;
        let finite = model
            .weights
            .iter()
            .flatten()
            .chain(model.bias.iter())
            .all(|w| w.is_finite());
        if !finite {
            return Err(PredictorError::NonFinite);
        }
        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self, PredictorError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn probabilities(&self, features: &Features) -> [f64; 3] {
        let x = features.to_vector();
        let mut scores = [0.0; 3];
        for (score, (row, bias)) in scores.iter_mut().zip(self.weights.iter().zip(self.bias)) {
            *score = row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + bias;
        }
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        [exp[0] / total, exp[1] / total, exp[2] / total]
    }
}

impl DifficultyPredictor for LinearPredictor {
    fn predict(&self, features: &Features) -> Option<Prediction> {
        let probs = self.probabilities(features);
        let (best, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        if !confidence.is_finite() {
            return None;
        }
        Some(Prediction {
            transition: OUTCOMES[best],
            confidence,
        })
    }
}

/// Runs `init` on a worker thread and waits at most `timeout` for it.
///
/// On timeout the receiver is dropped, so the worker's eventual result is
/// discarded and freed when it tries to send.
pub fn init_with_timeout<P, F>(init: F, timeout: Duration) -> Result<P, PredictorError>
where
    P: Send + 'static,
    F: FnOnce() -> Result<P, PredictorError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(init());
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(PredictorError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(PredictorError::Disconnected),
    }
}

/// Loads the configured model, or returns a `NullPredictor` when there is no
/// model or it cannot be loaded in time. Never retried.
pub fn load_predictor(model: Option<&Path>, timeout: Duration) -> Arc<dyn DifficultyPredictor> {
    let Some(path) = model else {
        return Arc::new(NullPredictor);
    };
    let path: PathBuf = path.to_path_buf();
    let model_name = path.display().to_string();
    match init_with_timeout(move || LinearPredictor::from_file(&path), timeout) {
        Ok(predictor) => {
            info!(model = %model_name, "difficulty predictor loaded");
            Arc::new(predictor)
        }
        Err(err) => {
            warn!(model = %model_name, error = %err, "predictor unavailable, using rule-based difficulty");
            Arc::new(NullPredictor)
        }
    }
}
