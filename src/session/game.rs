use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::engine::adaptive::{AdaptiveEngine, Assessment, Thresholds, Transition};
use crate::engine::level::DifficultyLevel;
use crate::engine::predictor::DifficultyPredictor;
use crate::engine::rating::{RatingUpdate, session_score};
use crate::generator::PuzzleGenerator;
use crate::generator::puzzle::Puzzle;
use crate::session::result::{AttemptRecord, DifficultyTransition, SessionSummary};
use crate::session::tracker::PerformanceTracker;

/// Inputs fixed for the whole session, supplied by whoever persists profiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub player_name: String,
    pub starting_level: DifficultyLevel,
    pub prior_rating: i32,
    pub games_played: u32,
}

/// Outcome of one submitted answer.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub attempt: AttemptRecord,
    pub previous_level: DifficultyLevel,
    pub next_level: DifficultyLevel,
    pub transition: Transition,
    pub finished: bool,
    pub running: SessionSummary,
}

impl RoundResult {
    pub fn level_changed(&self) -> bool {
        self.previous_level != self.next_level
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub player_name: String,
    pub summary: SessionSummary,
    pub final_level: DifficultyLevel,
    pub rating: RatingUpdate,
    pub assessment: Assessment,
    pub transitions: Vec<DifficultyTransition>,
    pub recommended_level: DifficultyLevel,
}

/// One bounded run of puzzles. The caller owns it and drives it one answer
/// at a time; presentation and timing stay with the caller.
pub struct Session {
    context: SessionContext,
    generator: PuzzleGenerator,
    tracker: PerformanceTracker,
    engine: AdaptiveEngine,
    level: DifficultyLevel,
    puzzle: Puzzle,
    length: usize,
    finished: bool,
}

impl Session {
    pub fn new(
        config: &Config,
        context: SessionContext,
        predictor: Arc<dyn DifficultyPredictor>,
    ) -> Result<Self, ConfigError> {
        let generator = PuzzleGenerator::new(config.levels.clone());
        Self::with_generator(config, context, generator, predictor)
    }

    pub fn with_generator(
        config: &Config,
        context: SessionContext,
        mut generator: PuzzleGenerator,
        predictor: Arc<dyn DifficultyPredictor>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        generator.levels().validate()?;

        let engine = AdaptiveEngine::new(Thresholds::from_config(config))
            .with_predictor(predictor, config.predictor_confidence);
        let level = context.starting_level;
        let puzzle = generator.generate(level);
        info!(player = %context.player_name, %level, puzzles = config.session_length, "session started");

        Ok(Self {
            context,
            generator,
            tracker: PerformanceTracker::new(),
            engine,
            level,
            puzzle,
            length: config.session_length,
            finished: false,
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn current_puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn current_level(&self) -> DifficultyLevel {
        self.level
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// 1-based number of the puzzle currently shown.
    pub fn puzzle_number(&self) -> usize {
        (self.tracker.len() + 1).min(self.length)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Records the answer to the current puzzle and, unless that was the
    /// last one, picks the next level and puzzle. `None` once finished.
    pub fn submit_answer(&mut self, submitted: i64, elapsed: Duration) -> Option<RoundResult> {
        if self.finished {
            return None;
        }

        self.tracker
            .record(AttemptRecord::from_puzzle(&self.puzzle, submitted, elapsed));
        let attempt = self.tracker.attempts().last()?.clone();
        debug!(
            number = attempt.attempt_number,
            puzzle = %attempt.display,
            submitted,
            correct = attempt.correct,
            elapsed_ms = attempt.elapsed_ms,
            "answer recorded"
        );

        let previous_level = self.level;
        if self.tracker.len() >= self.length {
            self.finished = true;
        } else {
            self.level = self.engine.decide(previous_level, &self.tracker);
            self.puzzle = self.generator.generate(self.level);
        }

        Some(RoundResult {
            attempt,
            previous_level,
            next_level: self.level,
            transition: Transition::between(previous_level, self.level),
            finished: self.finished,
            running: self.tracker.session_summary(),
        })
    }

    /// Scores the attempts made so far. Can be called before the last puzzle
    /// to end a session early.
    pub fn finish(&self) -> SessionReport {
        let summary = self.tracker.session_summary();
        let final_level = summary.ending_level.unwrap_or(self.level);
        let score = if summary.total == 0 {
            0
        } else {
            session_score(summary.accuracy, summary.avg_time_ms, final_level)
        };
        let rating = RatingUpdate::compute(
            self.context.prior_rating,
            score,
            self.context.games_played,
        );
        info!(
            player = %self.context.player_name,
            score,
            delta = rating.delta,
            rating = rating.new_rating,
            "session finished"
        );

        SessionReport {
            player_name: self.context.player_name.clone(),
            summary,
            final_level,
            rating,
            assessment: self.engine.assess(&self.tracker),
            transitions: self.tracker.transitions().to_vec(),
            recommended_level: final_level,
        }
    }
}
