use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn index(self) -> usize {
        match self {
            DifficultyLevel::Easy => 0,
            DifficultyLevel::Medium => 1,
            DifficultyLevel::Hard => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn step_up(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(DifficultyLevel::Hard)
    }

    pub fn step_down(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(DifficultyLevel::Easy)
    }

    pub fn name(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Medium => "Medium",
            DifficultyLevel::Hard => "Hard",
        }
    }

    /// Score multiplier applied at session end.
    pub fn multiplier(self) -> f64 {
        match self {
            DifficultyLevel::Easy => 1.0,
            DifficultyLevel::Medium => 1.5,
            DifficultyLevel::Hard => 2.0,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '×',
            Operation::Div => '÷',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Operation::Add),
            '-' | '−' => Some(Operation::Sub),
            '×' | '*' | 'x' => Some(Operation::Mul),
            '÷' | '/' => Some(Operation::Div),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operation::Add | Operation::Sub => 1,
            Operation::Mul | Operation::Div => 2,
        }
    }
}

/// Shapes of multi-operand puzzles that exercise order of operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// `a + b × c`
    MultiplicationFirst,
    /// `(a ± b) × c`, `(a ± b) + c` or `(a + b) × (c - d)`
    Parentheses,
    /// `a + b × c - d`
    MixedOperations,
    /// `a - b ÷ c`
    DivisionFirst,
}

/// Largest operand range a level may use. `(a + b) × (c - d)` can reach
/// `2·max·max`, which has to fit in a `u32` answer.
pub const MAX_OPERAND: u32 = 46_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub min: u32,
    pub max: u32,
    pub operations: Vec<Operation>,
    pub max_operands: usize,
    pub use_bodmas: bool,
    pub simple_prob: f64,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

impl LevelConfig {
    pub fn easy() -> Self {
        Self {
            min: 1,
            max: 10,
            operations: vec![Operation::Add, Operation::Sub],
            max_operands: 2,
            use_bodmas: false,
            simple_prob: 1.0,
            patterns: Vec::new(),
        }
    }

    pub fn medium() -> Self {
        Self {
            min: 1,
            max: 20,
            operations: vec![Operation::Add, Operation::Sub, Operation::Mul],
            max_operands: 3,
            use_bodmas: true,
            simple_prob: 0.5,
            patterns: vec![Pattern::MultiplicationFirst, Pattern::Parentheses],
        }
    }

    pub fn hard() -> Self {
        Self {
            min: 10,
            max: 50,
            operations: vec![
                Operation::Add,
                Operation::Sub,
                Operation::Mul,
                Operation::Div,
            ],
            max_operands: 4,
            use_bodmas: true,
            simple_prob: 0.3,
            patterns: vec![
                Pattern::MultiplicationFirst,
                Pattern::DivisionFirst,
                Pattern::Parentheses,
                Pattern::MixedOperations,
            ],
        }
    }

    /// Range summary shown on the welcome screen, e.g. "1-20, + - ×".
    pub fn describe(&self) -> String {
        let ops: Vec<String> = self.operations.iter().map(|op| op.symbol().to_string()).collect();
        format!("{}-{}, {}", self.min, self.max, ops.join(" "))
    }

    fn validate(&self, level: DifficultyLevel) -> Result<(), ConfigError> {
        if self.min < 1 || self.min >= self.max {
            return Err(ConfigError::InvalidRange {
                level,
                min: self.min,
                max: self.max,
            });
        }
        if self.max > MAX_OPERAND {
            return Err(ConfigError::RangeTooLarge {
                level,
                max: self.max,
                limit: MAX_OPERAND,
            });
        }
        if self.operations.is_empty() {
            return Err(ConfigError::NoOperations(level));
        }
        if !(2..=4).contains(&self.max_operands) {
            return Err(ConfigError::OperandCount {
                level,
                count: self.max_operands,
            });
        }
        if !(0.0..=1.0).contains(&self.simple_prob) {
            return Err(ConfigError::Probability {
                level,
                value: self.simple_prob,
            });
        }
        if self.use_bodmas {
            if self.max_operands < 3 {
                return Err(ConfigError::OperandCount {
                    level,
                    count: self.max_operands,
                });
            }
            if self.patterns.is_empty() {
                return Err(ConfigError::NoPatterns(level));
            }
            if self.patterns.contains(&Pattern::DivisionFirst)
                && !self.operations.contains(&Operation::Div)
            {
                return Err(ConfigError::PatternNeedsOperation {
                    level,
                    pattern: Pattern::DivisionFirst,
                    operation: Operation::Div,
                });
            }
        }
        Ok(())
    }
}

/// Per-level configuration, immutable once a session starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    #[serde(default = "LevelConfig::easy")]
    pub easy: LevelConfig,
    #[serde(default = "LevelConfig::medium")]
    pub medium: LevelConfig,
    #[serde(default = "LevelConfig::hard")]
    pub hard: LevelConfig,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            easy: LevelConfig::easy(),
            medium: LevelConfig::medium(),
            hard: LevelConfig::hard(),
        }
    }
}

impl LevelTable {
    pub fn get(&self, level: DifficultyLevel) -> &LevelConfig {
        match level {
            DifficultyLevel::Easy => &self.easy,
            DifficultyLevel::Medium => &self.medium,
            DifficultyLevel::Hard => &self.hard,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for level in DifficultyLevel::ALL {
            self.get(level).validate(level)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_saturate_at_bounds() {
        assert_eq!(DifficultyLevel::Easy.step_down(), DifficultyLevel::Easy);
        assert_eq!(DifficultyLevel::Easy.step_up(), DifficultyLevel::Medium);
        assert_eq!(DifficultyLevel::Hard.step_up(), DifficultyLevel::Hard);
        assert_eq!(DifficultyLevel::Hard.step_down(), DifficultyLevel::Medium);
    }

    #[test]
    fn from_index_rejects_out_of_range() {
        assert_eq!(DifficultyLevel::from_index(2), Some(DifficultyLevel::Hard));
        assert_eq!(DifficultyLevel::from_index(3), None);
    }

    #[test]
    fn default_table_is_valid() {
        assert!(LevelTable::default().validate().is_ok());
    }

    #[test]
    fn medium_excludes_mixed_operations() {
        let table = LevelTable::default();
        assert!(!table.medium.patterns.contains(&Pattern::MixedOperations));
        assert!(!table.easy.use_bodmas);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut table = LevelTable::default();
        table.easy.min = 10;
        table.easy.max = 5;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::InvalidRange { level: DifficultyLevel::Easy, .. })
        ));
    }

    #[test]
    fn oversized_range_is_rejected() {
        let mut table = LevelTable::default();
        table.hard.max = MAX_OPERAND;
        assert!(table.validate().is_ok());
        table.hard.max = MAX_OPERAND + 1;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::RangeTooLarge { level: DifficultyLevel::Hard, .. })
        ));
    }

    #[test]
    fn division_pattern_requires_division() {
        let mut table = LevelTable::default();
        table.medium.patterns.push(Pattern::DivisionFirst);
        assert!(matches!(
            table.validate(),
            Err(ConfigError::PatternNeedsOperation { .. })
        ));
    }

    #[test]
    fn levels_deserialize_from_snake_case() {
        let level: DifficultyLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(level, DifficultyLevel::Medium);
    }
}
