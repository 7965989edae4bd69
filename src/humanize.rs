//! Human-readable count formatting and ISO-8601 duration parsing

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number in duration: {0}")]
    InvalidNumber(String),

    #[error("Invalid duration unit: {0}")]
    InvalidUnit(char),
}

/// View/like counter with compact rendering (`1.2M`, `3.4K`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Count(pub u64);

impl Count {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn to_compact(&self) -> String {
        const UNITS: &[(&str, u64)] = &[("M", 1_000_000), ("K", 1_000)];

        for &(unit, divisor) in UNITS {
            if self.0 >= divisor {
                return format!("{:.1}{}", self.0 as f64 / divisor as f64, unit);
            }
        }

        self.0.to_string()
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact())
    }
}

/// Video length parsed from an ISO-8601 duration such as `PT1H2M3S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoDuration(pub u64);

impl VideoDuration {
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Lenient parse: anything unparseable counts as zero seconds
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for VideoDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();
        let body = s
            .strip_prefix('P')
            .ok_or_else(|| ParseError::InvalidFormat(s.clone()))?;

        let mut total = 0f64;
        let mut number = String::new();
        let mut in_time = false;

        for ch in body.chars() {
            match ch {
                'T' => in_time = true,
                c if c.is_ascii_digit() || c == '.' => number.push(c),
                unit => {
                    let value: f64 = number
                        .parse()
                        .map_err(|_| ParseError::InvalidNumber(number.clone()))?;
                    number.clear();

                    let multiplier = match (unit, in_time) {
                        ('W', false) => 7.0 * 86_400.0,
                        ('D', false) => 86_400.0,
                        ('H', true) => 3_600.0,
                        ('M', true) => 60.0,
                        ('S', true) => 1.0,
                        _ => return Err(ParseError::InvalidUnit(unit)),
                    };
                    total += value * multiplier;
                }
            }
        }

        if !number.is_empty() {
            return Err(ParseError::InvalidFormat(s));
        }

        Ok(VideoDuration(total as u64))
    }
}
