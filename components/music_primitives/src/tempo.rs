use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TempoError {
    #[error("Tempo must be non-negative, got {0}")]
    Negative(f64),

    #[error("Tempo must be finite, got {0}")]
    NotFinite(f64),
}

/// Global tempo estimate of a clip in beats per minute.
///
/// Unlike a tagged BPM this is an analysis result, so zero is a valid value:
/// it is what the estimator reports for audio without a detectable pulse.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo(f64);

impl Tempo {
    /// Best-effort value for silent or unbeat-able audio
    pub const ZERO: Self = Self(0.0);

    /// Create a tempo from a BPM value
    ///
    /// # Examples
    /// ```
    /// # use music_primitives::{Tempo, TempoError};
    /// let tempo = Tempo::from_bpm(117.45)?;
    /// assert_eq!(tempo.bpm(), 117.45);
    /// # Ok::<(), TempoError>(())
    /// ```
    pub fn from_bpm(bpm: f64) -> Result<Self, TempoError> {
        if !bpm.is_finite() {
            return Err(TempoError::NotFinite(bpm));
        }
        if bpm < 0.0 {
            return Err(TempoError::Negative(bpm));
        }
        Ok(Self(bpm))
    }

    pub fn bpm(&self) -> f64 {
        self.0
    }

    /// Absolute difference in BPM between two estimates
    ///
    /// # Examples
    /// ```
    /// # use music_primitives::{Tempo, TempoError};
    /// let a = Tempo::from_bpm(120.0)?;
    /// let b = Tempo::from_bpm(128.0)?;
    /// assert_eq!(a.distance(b), 8.0);
    /// assert_eq!(b.distance(a), 8.0);
    /// # Ok::<(), TempoError>(())
    /// ```
    pub fn distance(&self, other: Tempo) -> f64 {
        (self.0 - other.0).abs()
    }

    /// Proximity in (0, 1]: `1 / (1 + |a - b|)`
    ///
    /// Equal tempi give exactly 1; the value decays with the BPM difference
    /// but never reaches 0.
    pub fn proximity(&self, other: Tempo) -> f64 {
        1.0 / (1.0 + self.distance(other))
    }
}

impl TryFrom<f64> for Tempo {
    type Error = TempoError;

    fn try_from(bpm: f64) -> Result<Self, Self::Error> {
        Self::from_bpm(bpm)
    }
}

impl From<Tempo> for f64 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
