pub mod bodmas;
pub mod expr;
pub mod puzzle;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::engine::level::{DifficultyLevel, LevelConfig, LevelTable, Operation};
use crate::generator::puzzle::{Puzzle, Token};

/// Operand range used for multiplication and division regardless of level.
pub const TIMES_TABLE_RANGE: (u32, u32) = (1, 10);

pub struct PuzzleGenerator {
    levels: LevelTable,
    rng: SmallRng,
}

impl PuzzleGenerator {
    pub fn new(levels: LevelTable) -> Self {
        Self {
            levels,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(levels: LevelTable, seed: u64) -> Self {
        Self {
            levels,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn generate(&mut self, level: DifficultyLevel) -> Puzzle {
        let config = self.levels.get(level);
        let roll: f64 = self.rng.gen_range(0.0..1.0);
        let (tokens, answer) = if roll < config.simple_prob || !config.use_bodmas {
            simple_problem(config, &mut self.rng)
        } else {
            bodmas::complex_problem(config, &mut self.rng)
        };
        let puzzle = Puzzle::new(tokens, answer, level);
        debug!(%level, puzzle = %puzzle, answer, "generated puzzle");
        puzzle
    }
}

fn simple_problem(config: &LevelConfig, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let op = config.operations[rng.gen_range(0..config.operations.len())];
    let (min, max) = (config.min, config.max);
    let (a, b, answer) = match op {
        Operation::Add => {
            let a = rng.gen_range(min..=max);
            let b = rng.gen_range(min..=max);
            (a, b, a + b)
        }
        Operation::Sub => {
            let (a, b) = distinct_descending(min, max, rng);
            (a, b, a - b)
        }
        Operation::Mul => {
            let (lo, hi) = TIMES_TABLE_RANGE;
            let a = rng.gen_range(lo..=hi);
            let b = rng.gen_range(lo..=hi);
            (a, b, a * b)
        }
        Operation::Div => {
            let (lo, hi) = TIMES_TABLE_RANGE;
            let divisor = rng.gen_range(lo..=hi);
            let quotient = rng.gen_range(lo..=hi);
            (divisor * quotient, divisor, quotient)
        }
    };
    (vec![Token::Num(a), Token::Op(op), Token::Num(b)], answer)
}

/// Two different values from `min..=max`, larger first, so `a - b > 0`.
/// Needs `min < max`, which a validated `LevelConfig` guarantees.
pub(crate) fn distinct_descending(min: u32, max: u32, rng: &mut SmallRng) -> (u32, u32) {
    let a = rng.gen_range(min..=max);
    let mut b = rng.gen_range(min..max);
    if b >= a {
        b += 1;
    }
    (a.max(b), a.min(b))
}
