use serde::{Deserialize, Serialize};

use crate::engine::level::DifficultyLevel;

pub const DEFAULT_RATING: i32 = 1000;
pub const RATING_FLOOR: i32 = 100;
/// Fixed opponent rating every session is measured against.
const REFERENCE_RATING: f64 = 1500.0;
/// Response time at which the time bonus reaches zero.
const TIME_CAP_MS: f64 = 15_000.0;
const MAX_TIME_BONUS: f64 = 300.0;
const CONSISTENCY_BONUS: f64 = 100.0;
const CONSISTENCY_ACCURACY: f64 = 80.0;
const PROVISIONAL_GAMES: u32 = 10;

/// Session score from whole-session accuracy (percent), mean response time
/// and the level the session ended on.
pub fn session_score(accuracy_pct: f64, avg_time_ms: f64, level: DifficultyLevel) -> u32 {
    let accuracy = accuracy_pct.clamp(0.0, 100.0);
    let time_bonus = (MAX_TIME_BONUS - avg_time_ms / TIME_CAP_MS * MAX_TIME_BONUS).max(0.0);
    let bonus = if accuracy > CONSISTENCY_ACCURACY {
        CONSISTENCY_BONUS
    } else {
        0.0
    };
    let score = (accuracy * 5.0 + time_bonus) * level.multiplier() + bonus;
    score.round() as u32
}

pub fn expected_outcome(prior_rating: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((REFERENCE_RATING - prior_rating as f64) / 400.0))
}

pub fn k_factor(games_played: u32) -> f64 {
    if games_played < PROVISIONAL_GAMES {
        40.0
    } else {
        20.0
    }
}

pub fn rating_delta(prior_rating: i32, score: u32, games_played: u32) -> i32 {
    let actual = (score as f64 / 1000.0).min(1.0);
    let expected = expected_outcome(prior_rating);
    (k_factor(games_played) * (actual - expected)).round() as i32
}

pub fn apply_delta(prior_rating: i32, delta: i32) -> i32 {
    prior_rating.saturating_add(delta).max(RATING_FLOOR)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub score: u32,
    pub prior_rating: i32,
    pub delta: i32,
    pub new_rating: i32,
}

impl RatingUpdate {
    pub fn compute(prior_rating: i32, score: u32, games_played: u32) -> Self {
        let delta = rating_delta(prior_rating, score, games_played);
        Self {
            score,
            prior_rating,
            delta,
            new_rating: apply_delta(prior_rating, delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_fast_hard_session() {
        assert_eq!(session_score(100.0, 3000.0, DifficultyLevel::Hard), 1580);
    }

    #[test]
    fn time_bonus_never_negative() {
        assert_eq!(session_score(0.0, 60_000.0, DifficultyLevel::Easy), 0);
        assert_eq!(session_score(50.0, 15_000.0, DifficultyLevel::Medium), 375);
    }

    #[test]
    fn consistency_bonus_needs_more_than_eighty() {
        let at = session_score(80.0, 15_000.0, DifficultyLevel::Easy);
        let above = session_score(81.0, 15_000.0, DifficultyLevel::Easy);
        assert_eq!(at, 400);
        assert_eq!(above, 505);
    }

    #[test]
    fn new_player_delta() {
        assert_eq!(rating_delta(1000, 1580, 5), 38);
    }

    #[test]
    fn experienced_player_uses_smaller_k() {
        assert_eq!(rating_delta(1000, 1580, 10), 19);
    }

    #[test]
    fn rating_never_drops_below_floor() {
        let update = RatingUpdate::compute(100, 0, 0);
        assert!(update.delta <= 0);
        assert_eq!(update.new_rating, RATING_FLOOR);
        assert_eq!(apply_delta(120, -40), RATING_FLOOR);
        assert_eq!(apply_delta(i32::MIN, -40), RATING_FLOOR);
    }
}
