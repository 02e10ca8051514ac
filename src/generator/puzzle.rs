use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::level::{DifficultyLevel, Operation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Num(u32),
    Op(Operation),
    Open,
    Close,
}

impl Token {
    pub fn add() -> Self {
        Token::Op(Operation::Add)
    }
    pub fn sub() -> Self {
        Token::Op(Operation::Sub)
    }
    pub fn mul() -> Self {
        Token::Op(Operation::Mul)
    }
    pub fn div() -> Self {
        Token::Op(Operation::Div)
    }
}

/// A generated question. `answer` is what `expr::evaluate(&tokens)` yields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub tokens: Vec<Token>,
    pub answer: u32,
    pub level: DifficultyLevel,
}

impl Puzzle {
    pub fn new(tokens: Vec<Token>, answer: u32, level: DifficultyLevel) -> Self {
        Self {
            tokens,
            answer,
            level,
        }
    }

    pub fn display(&self) -> String {
        render_tokens(&self.tokens)
    }

    pub fn operand_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Num(_)))
            .count()
    }

    pub fn has_parentheses(&self) -> bool {
        self.tokens.contains(&Token::Open)
    }

    pub fn is_correct(&self, submitted: i64) -> bool {
        submitted == i64::from(self.answer)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<Token> = None;
    for &token in tokens {
        let glue = matches!(prev, None | Some(Token::Open)) || token == Token::Close;
        if !glue {
            out.push(' ');
        }
        match token {
            Token::Num(n) => out.push_str(&n.to_string()),
            Token::Op(op) => out.push(op.symbol()),
            Token::Open => out.push('('),
            Token::Close => out.push(')'),
        }
        prev = Some(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_parentheses_without_inner_padding() {
        let tokens = vec![
            Token::Open,
            Token::Num(12),
            Token::add(),
            Token::Num(3),
            Token::Close,
            Token::mul(),
            Token::Open,
            Token::Num(9),
            Token::sub(),
            Token::Num(4),
            Token::Close,
        ];
        assert_eq!(render_tokens(&tokens), "(12 + 3) × (9 - 4)");
    }

    #[test]
    fn counts_operands() {
        let puzzle = Puzzle::new(
            vec![Token::Num(7), Token::add(), Token::Num(3)],
            10,
            DifficultyLevel::Easy,
        );
        assert_eq!(puzzle.operand_count(), 2);
        assert_eq!(puzzle.to_string(), "7 + 3");
        assert!(puzzle.is_correct(10));
        assert!(!puzzle.is_correct(-10));
    }
}
