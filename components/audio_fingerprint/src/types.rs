use crate::config::{SpectrumSource, TimeReduction};
use crate::error::FingerprintError;
use music_primitives::Tempo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a spectral descriptor was produced. Descriptors are only comparable
/// when their representations are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Representation {
    MelStatistics {
        bands: usize,
        source: SpectrumSource,
    },
    Cepstral {
        coefficients: usize,
        reduction: TimeReduction,
    },
}

impl Representation {
    /// Number of values a descriptor of this representation holds
    pub fn descriptor_len(&self) -> usize {
        match *self {
            Representation::MelStatistics { bands, .. } => 2 * bands,
            Representation::Cepstral {
                coefficients,
                reduction: TimeReduction::Mean,
            } => coefficients,
            Representation::Cepstral {
                coefficients,
                reduction: TimeReduction::MeanVariance,
            } => 2 * coefficients,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::MelStatistics { bands, source } => {
                write!(f, "mel statistics ({} bands, {:?})", bands, source)
            }
            Representation::Cepstral {
                coefficients,
                reduction,
            } => write!(f, "cepstral ({} coefficients, {:?})", coefficients, reduction),
        }
    }
}

/// Fixed-length summary of a clip's frequency content over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDescriptor")]
pub struct SpectralDescriptor {
    representation: Representation,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct UncheckedDescriptor {
    representation: Representation,
    values: Vec<f32>,
}

impl TryFrom<UncheckedDescriptor> for SpectralDescriptor {
    type Error = FingerprintError;

    fn try_from(raw: UncheckedDescriptor) -> Result<Self, Self::Error> {
        Self::new(raw.representation, raw.values)
    }
}

impl SpectralDescriptor {
    pub fn new(representation: Representation, values: Vec<f32>) -> Result<Self, FingerprintError> {
        let expected = representation.descriptor_len();
        if values.len() != expected {
            return Err(FingerprintError::ShapeMismatch {
                left: representation,
                left_len: expected,
                right: representation,
                right_len: values.len(),
            });
        }
        Ok(Self {
            representation,
            values,
        })
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean norm, accumulated in f64
    pub fn magnitude(&self) -> f64 {
        self.values
            .iter()
            .map(|&v| v as f64 * v as f64)
            .sum::<f64>()
            .sqrt()
    }
}

/// Tempo plus spectral descriptor for one analysed clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongFingerprint {
    tempo: Tempo,
    spectral: SpectralDescriptor,
}

impl SongFingerprint {
    pub fn new(tempo: Tempo, spectral: SpectralDescriptor) -> Self {
        Self { tempo, spectral }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn spectral(&self) -> &SpectralDescriptor {
        &self.spectral
    }
}
