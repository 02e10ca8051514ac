use tracing::info;

use crate::session::result::{AttemptRecord, DifficultyTransition, Direction, SessionSummary};

/// Default number of recent attempts used for windowed statistics.
pub const DEFAULT_WINDOW: usize = 3;

/// Windows smaller than this carry no signal for difficulty changes.
pub const MIN_SIGNAL_ATTEMPTS: usize = 2;

/// Append-only log of the attempts made during one session.
#[derive(Clone, Debug, Default)]
pub struct PerformanceTracker {
    attempts: Vec<AttemptRecord>,
    transitions: Vec<DifficultyTransition>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mut attempt: AttemptRecord) {
        attempt.attempt_number = self.attempts.len() + 1;

        if let Some(prev) = self.attempts.last() {
            if prev.level != attempt.level {
                let direction = if attempt.level > prev.level {
                    Direction::Up
                } else {
                    Direction::Down
                };
                info!(from = %prev.level, to = %attempt.level, at = attempt.attempt_number, "difficulty changed");
                self.transitions.push(DifficultyTransition {
                    from: prev.level,
                    to: attempt.level,
                    direction,
                    at_attempt: attempt.attempt_number,
                });
            }
        }

        self.attempts.push(attempt);
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn transitions(&self) -> &[DifficultyTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn recent_window(&self, n: usize) -> &[AttemptRecord] {
        let start = self.attempts.len().saturating_sub(n);
        &self.attempts[start..]
    }

    /// Fraction correct over the last `n` attempts, or `None` when the window
    /// is too short to act on.
    pub fn windowed_accuracy(&self, n: usize) -> Option<f64> {
        let window = self.recent_window(n);
        if window.len() < MIN_SIGNAL_ATTEMPTS {
            return None;
        }
        let correct = window.iter().filter(|a| a.correct).count();
        Some(correct as f64 / window.len() as f64)
    }

    /// Mean response time in milliseconds over the last `n` attempts.
    pub fn windowed_average_time(&self, n: usize) -> Option<f64> {
        let window = self.recent_window(n);
        if window.is_empty() {
            return None;
        }
        let total: f64 = window.iter().map(|a| a.elapsed_ms as f64).sum();
        Some(total / window.len() as f64)
    }

    /// Length of the run of correct answers ending at the latest attempt.
    pub fn correct_streak(&self) -> usize {
        self.attempts.iter().rev().take_while(|a| a.correct).count()
    }

    pub fn session_summary(&self) -> SessionSummary {
        SessionSummary::from_attempts(&self.attempts)
    }

    pub fn reset(&mut self) {
        self.attempts.clear();
        self.transitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::level::DifficultyLevel;

    fn attempt(correct: bool, ms: u64, level: DifficultyLevel) -> AttemptRecord {
        let submitted = if correct { 10 } else { 9 };
        AttemptRecord::new("7 + 3", 10, submitted, ms, level)
    }

    #[test]
    fn numbers_attempts_in_order() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        tracker.record(attempt(false, 200, DifficultyLevel::Easy));
        let numbers: Vec<usize> = tracker.attempts().iter().map(|a| a.attempt_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn recent_window_is_bounded_by_history() {
        let mut tracker = PerformanceTracker::new();
        assert!(tracker.recent_window(3).is_empty());
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        assert_eq!(tracker.recent_window(3).len(), 1);
        for ms in [200, 300, 400] {
            tracker.record(attempt(true, ms, DifficultyLevel::Easy));
        }
        let window = tracker.recent_window(3);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].elapsed_ms, 200);
        assert_eq!(window[2].elapsed_ms, 400);
    }

    #[test]
    fn accuracy_needs_two_attempts() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        assert_eq!(tracker.windowed_accuracy(3), None);
        tracker.record(attempt(false, 100, DifficultyLevel::Easy));
        assert_eq!(tracker.windowed_accuracy(3), Some(0.5));
    }

    #[test]
    fn windowed_stats_ignore_older_attempts() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(attempt(false, 20_000, DifficultyLevel::Easy));
        for _ in 0..3 {
            tracker.record(attempt(true, 2000, DifficultyLevel::Easy));
        }
        assert_eq!(tracker.windowed_accuracy(3), Some(1.0));
        assert_eq!(tracker.windowed_average_time(3), Some(2000.0));
        assert_eq!(tracker.session_summary().accuracy, 75.0);
    }

    #[test]
    fn streak_counts_trailing_correct() {
        let mut tracker = PerformanceTracker::new();
        assert_eq!(tracker.correct_streak(), 0);
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        tracker.record(attempt(false, 100, DifficultyLevel::Easy));
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        assert_eq!(tracker.correct_streak(), 2);
    }

    #[test]
    fn records_level_transitions() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        tracker.record(attempt(true, 100, DifficultyLevel::Medium));
        tracker.record(attempt(true, 100, DifficultyLevel::Medium));
        tracker.record(attempt(false, 100, DifficultyLevel::Easy));
        let transitions = tracker.transitions();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].direction, Direction::Up);
        assert_eq!(transitions[0].at_attempt, 2);
        assert_eq!(transitions[1].direction, Direction::Down);
        assert_eq!(transitions[1].from, DifficultyLevel::Medium);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(attempt(true, 100, DifficultyLevel::Easy));
        tracker.record(attempt(true, 100, DifficultyLevel::Hard));
        tracker.reset();
        assert!(tracker.is_empty());
        assert!(tracker.transitions().is_empty());
    }
}
