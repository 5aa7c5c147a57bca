use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SI suffixes ESP-Miner uses when formatting difficulties, smallest first.
const SUFFIXES: [(char, f64); 6] = [
    ('k', 1e3),
    ('M', 1e6),
    ('G', 1e9),
    ('T', 1e12),
    ('P', 1e15),
    ('E', 1e18),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DifficultyParseError {
    #[error("difficulty is empty")]
    Empty,
    #[error("invalid difficulty `{0}`")]
    Invalid(String),
}

/// A share difficulty, parsed from either plain (`"4294967296"`) or suffixed
/// (`"4.29G"`) notation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Difficulty(pub f64);

impl Difficulty {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let last = trimmed.chars().last().ok_or(DifficultyParseError::Empty)?;

        let (number, multiplier) = match SUFFIXES.iter().find(|(suffix, _)| {
            // `K` shows up in some older builds.
            *suffix == last || (*suffix == 'k' && last == 'K')
        }) {
            Some((_, multiplier)) => (trimmed[..trimmed.len() - 1].trim_end(), *multiplier),
            None => (trimmed, 1.0),
        };

        let value: f64 = number
            .parse()
            .map_err(|_| DifficultyParseError::Invalid(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(DifficultyParseError::Invalid(s.to_string()));
        }

        Ok(Difficulty(value * multiplier))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SUFFIXES.iter().rev().find(|(_, multiplier)| self.0 >= *multiplier) {
            Some((suffix, multiplier)) => write!(f, "{:.2}{}", self.0 / multiplier, suffix),
            None => write!(f, "{}", self.0),
        }
    }
}
