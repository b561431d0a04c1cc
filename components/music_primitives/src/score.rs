use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ScoreError {
    #[error("Similarity score is not a number")]
    NotANumber,
}

/// Similarity between two songs in [0, 1], higher is more similar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimilarityScore(f64);

impl SimilarityScore {
    pub const MIN: Self = Self(0.0);
    pub const MAX: Self = Self(1.0);

    /// Create a score, clamping floating-point overshoot into [0, 1]
    ///
    /// # Examples
    /// ```
    /// # use music_primitives::{SimilarityScore, ScoreError};
    /// let score = SimilarityScore::clamped(1.0000000000000002)?;
    /// assert_eq!(score.value(), 1.0);
    /// # Ok::<(), ScoreError>(())
    /// ```
    pub fn clamped(value: f64) -> Result<Self, ScoreError> {
        if value.is_nan() {
            return Err(ScoreError::NotANumber);
        }
        Ok(Self(value.clamp(0.0, 1.0)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Descending order, for sorting rankings best-first
    pub fn cmp_descending(&self, other: &Self) -> Ordering {
        other.0.total_cmp(&self.0)
    }
}

impl TryFrom<f64> for SimilarityScore {
    type Error = ScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::clamped(value)
    }
}

impl From<SimilarityScore> for f64 {
    fn from(score: SimilarityScore) -> Self {
        score.0
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}", self.0)
    }
}
