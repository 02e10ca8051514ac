use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::level::DifficultyLevel;
use crate::generator::puzzle::Puzzle;

/// One answered puzzle. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_number: usize,
    pub display: String,
    pub correct_answer: u32,
    pub submitted_answer: i64,
    pub correct: bool,
    pub elapsed_ms: u64,
    pub level: DifficultyLevel,
}

impl AttemptRecord {
    pub fn new(
        display: impl Into<String>,
        correct_answer: u32,
        submitted_answer: i64,
        elapsed_ms: u64,
        level: DifficultyLevel,
    ) -> Self {
        Self {
            attempt_number: 0,
            display: display.into(),
            correct_answer,
            submitted_answer,
            correct: submitted_answer == i64::from(correct_answer),
            elapsed_ms,
            level,
        }
    }

    pub fn from_puzzle(puzzle: &Puzzle, submitted_answer: i64, elapsed: Duration) -> Self {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Self::new(
            puzzle.display(),
            puzzle.answer,
            submitted_answer,
            elapsed_ms,
            puzzle.level,
        )
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// A level change observed between two consecutive attempts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTransition {
    pub from: DifficultyLevel,
    pub to: DifficultyLevel,
    pub direction: Direction,
    pub at_attempt: usize,
}

/// Whole-session statistics, recomputed from the attempt log on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Percentage, 0-100.
    pub accuracy: f64,
    pub avg_time_ms: f64,
    pub starting_level: Option<DifficultyLevel>,
    pub ending_level: Option<DifficultyLevel>,
}

impl SessionSummary {
    pub fn from_attempts(attempts: &[AttemptRecord]) -> Self {
        let total = attempts.len();
        let correct = attempts.iter().filter(|a| a.correct).count();
        let (accuracy, avg_time_ms) = if total > 0 {
            let time: f64 = attempts.iter().map(|a| a.elapsed_ms as f64).sum();
            (correct as f64 / total as f64 * 100.0, time / total as f64)
        } else {
            (0.0, 0.0)
        };
        Self {
            total,
            correct,
            incorrect: total - correct,
            accuracy,
            avg_time_ms,
            starting_level: attempts.first().map(|a| a.level),
            ending_level: attempts.last().map(|a| a.level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::puzzle::Token;

    #[test]
    fn attempt_from_puzzle_marks_correctness() {
        let puzzle = Puzzle::new(
            vec![Token::Num(7), Token::add(), Token::Num(3)],
            10,
            DifficultyLevel::Easy,
        );
        let attempt = AttemptRecord::from_puzzle(&puzzle, 10, Duration::from_millis(2000));
        assert!(attempt.correct);
        assert_eq!(attempt.display, "7 + 3");
        assert_eq!(attempt.elapsed_ms, 2000);
        assert_eq!(attempt.level, DifficultyLevel::Easy);

        let wrong = AttemptRecord::from_puzzle(&puzzle, 11, Duration::from_millis(500));
        assert!(!wrong.correct);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = SessionSummary::from_attempts(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.avg_time_ms, 0.0);
        assert!(summary.starting_level.is_none());
    }

    #[test]
    fn summary_tracks_levels_and_means() {
        let attempts = vec![
            AttemptRecord::new("1 + 1", 2, 2, 1000, DifficultyLevel::Easy),
            AttemptRecord::new("2 + 2", 4, 5, 3000, DifficultyLevel::Medium),
        ];
        let summary = SessionSummary::from_attempts(&attempts);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 1);
        assert!((summary.accuracy - 50.0).abs() < 1e-9);
        assert!((summary.avg_time_ms - 2000.0).abs() < 1e-9);
        assert_eq!(summary.starting_level, Some(DifficultyLevel::Easy));
        assert_eq!(summary.ending_level, Some(DifficultyLevel::Medium));
    }
}
