use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub length: u32,
    pub count: u32,
}

impl Item {
    pub fn new(length: u32, count: u32) -> Self {
        Self { length, count }
    }
}

/// One mutable record per distinct length; `count` is what is still uncut.
/// Shared between the scheduler and the packer's choose/undo search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub length: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub combo: Vec<u32>,
    pub waste: u32,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub real_bars: usize,
    pub ideal_bars: u64,
    pub efficiency: f64,
    pub total_length: u64,
    pub total_waste: u64,
    pub kerf: u32,
    pub bar_length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    EmptyDemand,
    InvalidLength,
    InfeasibleRemainder,
    BarCountExceeded(usize),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::EmptyDemand => write!(f, "no items to cut"),
            SolveError::InvalidLength => write!(f, "piece lengths must be greater than zero"),
            SolveError::InfeasibleRemainder => {
                write!(f, "remaining pieces cannot be combined onto a bar")
            }
            SolveError::BarCountExceeded(limit) => write!(f, "too many bars (limit {limit})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub bars: Vec<Bar>,
    pub stats: Option<Stats>,
    pub error: Option<SolveError>,
}

impl Solution {
    pub fn ok(bars: Vec<Bar>, stats: Stats) -> Self {
        Self {
            bars,
            stats: Some(stats),
            error: None,
        }
    }

    /// Bars committed before the failure are kept so callers can show them.
    pub fn error(error: SolveError, bars: Vec<Bar>) -> Self {
        Self {
            bars,
            stats: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn total_waste(&self) -> u64 {
        self.bars.iter().map(|b| b.waste as u64).sum()
    }
}

pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    // Some clients send 3.0 instead of 3
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )))
    }
}
