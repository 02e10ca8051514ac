//! Parsing and checked evaluation of puzzle expressions.
//!
//! Evaluation follows the usual precedence (× and ÷ bind tighter than + and -,
//! left associative, parentheses first) and refuses any step a puzzle must
//! never contain: inexact division, division by zero, or a subtraction that
//! goes below zero.

use thiserror::Error;

use crate::engine::level::Operation;
use crate::generator::puzzle::Token;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("malformed expression: {0}")]
    Malformed(String),
    #[error("{dividend} ÷ {divisor} is not a whole number")]
    InexactDivision { dividend: i64, divisor: i64 },
    #[error("division by zero")]
    DivisionByZero,
    #[error("{lhs} - {rhs} goes below zero")]
    NegativeSubtraction { lhs: i64, rhs: i64 },
    #[error("result is too large")]
    Overflow,
}

pub fn parse(text: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if let Some(mut value) = ch.to_digit(10) {
            chars.next();
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(|| EvalError::Malformed("number too large".to_string()))?;
                chars.next();
            }
            tokens.push(Token::Num(value));
        } else if ch == '(' {
            chars.next();
            tokens.push(Token::Open);
        } else if ch == ')' {
            chars.next();
            tokens.push(Token::Close);
        } else if let Some(op) = Operation::from_symbol(ch) {
            chars.next();
            tokens.push(Token::Op(op));
        } else {
            return Err(EvalError::Malformed(format!("unexpected '{ch}'")));
        }
    }
    Ok(tokens)
}

pub fn evaluate(tokens: &[Token]) -> Result<i64, EvalError> {
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos != tokens.len() {
        return Err(EvalError::Malformed(format!(
            "trailing input at token {}",
            parser.pos
        )));
    }
    Ok(value)
}

pub fn evaluate_str(text: &str) -> Result<i64, EvalError> {
    evaluate(&parse(text)?)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek_op(&self, precedence: u8) -> Option<Operation> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) if op.precedence() == precedence => Some(*op),
            _ => None,
        }
    }

    fn expression(&mut self) -> Result<i64, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek_op(1) {
            self.pos += 1;
            let rhs = self.term()?;
            value = apply(op, value, rhs)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, EvalError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek_op(2) {
            self.pos += 1;
            let rhs = self.factor()?;
            value = apply(op, value, rhs)?;
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64, EvalError> {
        match self.tokens.get(self.pos) {
            Some(Token::Num(n)) => {
                self.pos += 1;
                Ok(i64::from(*n))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let value = self.expression()?;
                match self.tokens.get(self.pos) {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(value)
                    }
                    _ => Err(EvalError::Malformed("unclosed parenthesis".to_string())),
                }
            }
            Some(other) => Err(EvalError::Malformed(format!(
                "expected number, found {other:?}"
            ))),
            None => Err(EvalError::Malformed("unexpected end".to_string())),
        }
    }
}

fn apply(op: Operation, lhs: i64, rhs: i64) -> Result<i64, EvalError> {
    match op {
        Operation::Add => lhs.checked_add(rhs).ok_or(EvalError::Overflow),
        Operation::Sub => {
            if rhs > lhs {
                Err(EvalError::NegativeSubtraction { lhs, rhs })
            } else {
                Ok(lhs - rhs)
            }
        }
        Operation::Mul => lhs.checked_mul(rhs).ok_or(EvalError::Overflow),
        Operation::Div => {
            if rhs == 0 {
                Err(EvalError::DivisionByZero)
            } else if lhs % rhs != 0 {
                Err(EvalError::InexactDivision {
                    dividend: lhs,
                    divisor: rhs,
                })
            } else {
                Ok(lhs / rhs)
            }
        }
    }
}
