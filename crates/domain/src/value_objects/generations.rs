//! Requested ancestor depth for a fill.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Deepest tree a single fill may build. The tree doubles per level.
pub const MAX_GENERATIONS: u32 = 20;

/// Number of ancestor levels to synthesize beyond the root person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Generations(u32);

impl Generations {
    /// Validate a raw depth.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the depth is negative or exceeds
    /// [`MAX_GENERATIONS`].
    pub fn new(depth: i64) -> Result<Self, DomainError> {
        if depth < 0 {
            return Err(DomainError::validation(format!(
                "Generations cannot be negative: {}",
                depth
            )));
        }
        if depth > i64::from(MAX_GENERATIONS) {
            return Err(DomainError::validation(format!(
                "Generations cannot exceed {}: {}",
                MAX_GENERATIONS, depth
            )));
        }
        Ok(Self(depth as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Persons created by the engine: `2^(G+1) - 2`.
    pub fn synthetic_person_count(self) -> u64 {
        (1u64 << (self.0 + 1)) - 2
    }

    /// Persons in the tree including the root: `2^(G+1) - 1`.
    pub fn person_count(self) -> u64 {
        self.synthetic_person_count() + 1
    }

    /// Root birth plus birth, marriage and death for every synthetic person.
    pub fn event_count(self) -> u64 {
        1 + 3 * self.synthetic_person_count()
    }
}

impl fmt::Display for Generations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Generations {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Generations> for u32 {
    fn from(value: Generations) -> Self {
        value.0
    }
}
