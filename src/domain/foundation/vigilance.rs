//! Vigilance score value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Bounded awareness metric, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct VigilanceScore(u8);

impl VigilanceScore {
    /// Lowest possible score.
    pub const MIN: Self = Self(0);

    /// Highest possible score.
    pub const MAX: Self = Self(100);

    /// Starting score of every new progress record.
    pub const INITIAL: Self = Self(50);

    /// Creates a score, clamping to the valid range.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Creates a score, returning error if out of range.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=100).contains(&value) {
            return Err(ValidationError::out_of_range("vigilance_score", 0, 100, value));
        }
        Ok(Self(value as u8))
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns a new score moved by `delta`, saturating at the bounds.
    pub fn adjusted(&self, delta: i32) -> Self {
        Self::new(i64::from(self.0) + i64::from(delta))
    }
}

impl Default for VigilanceScore {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl TryFrom<i64> for VigilanceScore {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<VigilanceScore> for u8 {
    fn from(score: VigilanceScore) -> Self {
        score.0
    }
}

impl fmt::Display for VigilanceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fifty() {
        assert_eq!(VigilanceScore::default().value(), 50);
    }

    #[test]
    fn new_clamps_to_bounds() {
        assert_eq!(VigilanceScore::new(-10).value(), 0);
        assert_eq!(VigilanceScore::new(250).value(), 100);
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(VigilanceScore::try_new(101).is_err());
        assert!(VigilanceScore::try_new(-1).is_err());
        assert!(VigilanceScore::try_new(100).is_ok());
    }

    #[test]
    fn adjusted_saturates() {
        assert_eq!(VigilanceScore::new(99).adjusted(5).value(), 100);
        assert_eq!(VigilanceScore::new(1).adjusted(-5).value(), 0);
        assert_eq!(VigilanceScore::INITIAL.adjusted(2).value(), 52);
    }

    #[test]
    fn serde_validates_range() {
        assert!(serde_json::from_str::<VigilanceScore>("120").is_err());
        assert_eq!(serde_json::from_str::<VigilanceScore>("70").unwrap().value(), 70);
        assert_eq!(serde_json::to_string(&VigilanceScore::INITIAL).unwrap(), "50");
    }
}
