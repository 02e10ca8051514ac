use mathadv::engine::level::{MAX_OPERAND, Operation};
use mathadv::engine::{DifficultyLevel, LevelTable};
use mathadv::generator::PuzzleGenerator;
use mathadv::generator::expr::{evaluate, evaluate_str, parse};
use mathadv::generator::puzzle::Token;

const PUZZLES_PER_LEVEL: usize = 10_000;

/// `evaluate` rejects inexact division and negative subtraction, so an `Ok`
/// result covers those two guarantees as well as the answer itself.
#[test]
fn generated_puzzles_evaluate_to_their_answer() {
    for level in DifficultyLevel::ALL {
        let mut generator = PuzzleGenerator::with_seed(LevelTable::default(), 0xC0FFEE + level.index() as u64);
        for _ in 0..PUZZLES_PER_LEVEL {
            let puzzle = generator.generate(level);
            let value = evaluate(&puzzle.tokens)
                .unwrap_or_else(|e| panic!("{level} puzzle {puzzle} failed: {e}"));
            assert_eq!(value, i64::from(puzzle.answer), "{level} puzzle {puzzle}");
            assert!(puzzle.answer > 0, "{level} puzzle {puzzle} has non-positive answer");
            assert_eq!(puzzle.level, level);
        }
    }
}

#[test]
fn widest_allowed_range_keeps_answers_exact() {
    let mut levels = LevelTable::default();
    levels.hard.min = 1;
    levels.hard.max = MAX_OPERAND;
    levels.hard.simple_prob = 0.0;
    assert!(levels.validate().is_ok());

    let mut generator = PuzzleGenerator::with_seed(levels, 2024);
    for _ in 0..PUZZLES_PER_LEVEL {
        let puzzle = generator.generate(DifficultyLevel::Hard);
        assert_eq!(
            evaluate_str(&puzzle.display()),
            Ok(i64::from(puzzle.answer)),
            "{puzzle}"
        );
        assert!(puzzle.answer > 0, "{puzzle}");
    }
}

#[test]
fn displayed_text_evaluates_to_the_answer() {
    let mut generator = PuzzleGenerator::with_seed(LevelTable::default(), 99);
    for level in DifficultyLevel::ALL {
        for _ in 0..2_000 {
            let puzzle = generator.generate(level);
            let display = puzzle.display();
            assert_eq!(parse(&display).unwrap(), puzzle.tokens, "{display}");
            assert_eq!(evaluate_str(&display).unwrap(), i64::from(puzzle.answer));
        }
    }
}

#[test]
fn easy_puzzles_stay_simple() {
    let levels = LevelTable::default();
    let mut generator = PuzzleGenerator::with_seed(levels.clone(), 5);
    for _ in 0..PUZZLES_PER_LEVEL {
        let puzzle = generator.generate(DifficultyLevel::Easy);
        assert_eq!(puzzle.operand_count(), 2);
        assert!(!puzzle.has_parentheses());
        for token in &puzzle.tokens {
            match token {
                Token::Num(n) => assert!((levels.easy.min..=levels.easy.max).contains(n)),
                Token::Op(op) => assert!(matches!(op, Operation::Add | Operation::Sub)),
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn operand_counts_respect_level_limits() {
    let levels = LevelTable::default();
    let mut generator = PuzzleGenerator::with_seed(levels.clone(), 11);
    for level in DifficultyLevel::ALL {
        let max = levels.get(level).max_operands;
        for _ in 0..PUZZLES_PER_LEVEL {
            let count = generator.generate(level).operand_count();
            assert!((2..=max).contains(&count), "{level}: {count} operands");
        }
    }
}

#[test]
fn harder_levels_produce_complex_puzzles() {
    let mut generator = PuzzleGenerator::with_seed(LevelTable::default(), 3);
    let complex = (0..1_000)
        .filter(|_| generator.generate(DifficultyLevel::Hard).operand_count() > 2)
        .count();
    // simple probability on Hard is 0.3
    assert!(complex > 600, "only {complex} complex puzzles");
}
