//! Multi-operand puzzles that need order of operations to solve.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::engine::level::{LevelConfig, Operation, Pattern};
use crate::generator::distinct_descending;
use crate::generator::puzzle::Token;

/// Range for the operands of an embedded multiplication or division.
const FACTOR_RANGE: (u32, u32) = (2, 10);
/// Cap on the subtrahend in `a + b × c - d`.
const MIXED_SUBTRAHEND_CAP: u32 = 20;

pub fn complex_problem(config: &LevelConfig, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let operands = rng.gen_range(3..=config.max_operands.max(3));
    let pattern = config.patterns[rng.gen_range(0..config.patterns.len())];
    let (min, max) = (config.min, config.max);
    match pattern {
        Pattern::MultiplicationFirst => multiplication_first(min, max, rng),
        Pattern::Parentheses if operands >= 4 => grouped_product(min, max, rng),
        Pattern::Parentheses => parentheses(min, max, rng),
        Pattern::MixedOperations if operands >= 4 => mixed_operations(min, max, rng),
        Pattern::MixedOperations => multiplication_first(min, max, rng),
        Pattern::DivisionFirst => division_first(min, max, rng),
    }
}

fn factor(rng: &mut SmallRng) -> u32 {
    rng.gen_range(FACTOR_RANGE.0..=FACTOR_RANGE.1)
}

/// `a + b × c`
fn multiplication_first(min: u32, max: u32, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let a = rng.gen_range(min..=max);
    let b = factor(rng);
    let c = factor(rng);
    let tokens = vec![
        Token::Num(a),
        Token::add(),
        Token::Num(b),
        Token::mul(),
        Token::Num(c),
    ];
    (tokens, a + b * c)
}

/// `(a ± b) × c` or `(a ± b) + c`
fn parentheses(min: u32, max: u32, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let inner_op = if rng.gen_bool(0.5) {
        Operation::Add
    } else {
        Operation::Sub
    };
    let outer_op = if rng.gen_bool(0.5) {
        Operation::Mul
    } else {
        Operation::Add
    };

    let (a, b, inner) = match inner_op {
        Operation::Sub => {
            let (a, b) = distinct_descending(min, max, rng);
            (a, b, a - b)
        }
        _ => {
            let a = rng.gen_range(min..=max);
            let b = rng.gen_range(min..=max);
            (a, b, a + b)
        }
    };
    let c = factor(rng);
    let answer = match outer_op {
        Operation::Mul => inner * c,
        _ => inner + c,
    };

    let tokens = vec![
        Token::Open,
        Token::Num(a),
        Token::Op(inner_op),
        Token::Num(b),
        Token::Close,
        Token::Op(outer_op),
        Token::Num(c),
    ];
    (tokens, answer)
}

/// `(a + b) × (c - d)`
fn grouped_product(min: u32, max: u32, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let a = rng.gen_range(min..=max);
    let b = rng.gen_range(min..=max);
    let (a, b) = (a.max(b), a.min(b));
    let (c, d) = distinct_descending(min, max, rng);
    let tokens = vec![
        Token::Open,
        Token::Num(a),
        Token::add(),
        Token::Num(b),
        Token::Close,
        Token::mul(),
        Token::Open,
        Token::Num(c),
        Token::sub(),
        Token::Num(d),
        Token::Close,
    ];
    (tokens, (a + b) * (c - d))
}

/// `a + b × c - d`. When the result would not be positive, `a` is raised by
/// the deficit plus a random margin, which can push the answer above the
/// level's nominal range.
fn mixed_operations(min: u32, max: u32, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let mut a = rng.gen_range(min..=max);
    let b = factor(rng);
    let c = factor(rng);
    let d = rng.gen_range(min..=max.min(MIXED_SUBTRAHEND_CAP).max(min));

    let product = b * c;
    if a + product <= d {
        a += d - (a + product) + rng.gen_range(5..=15);
    }
    let tokens = vec![
        Token::Num(a),
        Token::add(),
        Token::Num(b),
        Token::mul(),
        Token::Num(c),
        Token::sub(),
        Token::Num(d),
    ];
    (tokens, a + product - d)
}

/// `a - b ÷ c` with `b` an exact multiple of `c`.
fn division_first(min: u32, max: u32, rng: &mut SmallRng) -> (Vec<Token>, u32) {
    let c = factor(rng);
    let quotient = factor(rng);
    let b = c * quotient;
    let mut a = rng.gen_range(min..=max);
    if a <= quotient {
        a += quotient - a + rng.gen_range(5..=10);
    }
    let tokens = vec![
        Token::Num(a),
        Token::sub(),
        Token::Num(b),
        Token::div(),
        Token::Num(c),
    ];
    (tokens, a - quotient)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::generator::expr::evaluate;

    fn assert_valid((tokens, answer): (Vec<Token>, u32)) {
        assert!(answer > 0);
        assert_eq!(evaluate(&tokens), Ok(i64::from(answer)));
    }

    #[test]
    fn mixed_operations_stays_positive() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..500 {
            assert_valid(mixed_operations(1, 20, &mut rng));
            assert_valid(mixed_operations(60, 80, &mut rng));
        }
    }

    #[test]
    fn mixed_operations_inflates_first_operand_on_deficit() {
        let mut rng = SmallRng::seed_from_u64(2);
        let inflated = (0..20_000)
            .map(|_| mixed_operations(1, 20, &mut rng))
            .filter(|(tokens, _)| matches!(tokens[0], Token::Num(a) if a > 20))
            .count();
        assert!(inflated > 0, "expected at least one corrected puzzle");
    }

    #[test]
    fn division_first_is_exact_and_positive() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            assert_valid(division_first(1, 5, &mut rng));
        }
    }

    #[test]
    fn parentheses_shapes_are_valid() {
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..500 {
            assert_valid(parentheses(1, 20, &mut rng));
            assert_valid(grouped_product(10, 50, &mut rng));
        }
    }

    #[test]
    fn complex_problems_use_only_listed_patterns() {
        let mut rng = SmallRng::seed_from_u64(5);
        let config = LevelConfig::medium();
        for _ in 0..500 {
            let (tokens, answer) = complex_problem(&config, &mut rng);
            assert!(!tokens.contains(&Token::div()));
            let operands = tokens.iter().filter(|t| matches!(t, Token::Num(_))).count();
            assert_eq!(operands, 3);
            assert_valid((tokens, answer));
        }
    }
}
