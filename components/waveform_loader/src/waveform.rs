use crate::error::DecodeError;
use std::time::Duration;

/// Decoded mono audio, immutable once constructed.
///
/// Always holds at least one sample and a non-zero sampling rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, DecodeError> {
        if samples.is_empty() {
            return Err(DecodeError::Empty);
        }
        if sample_rate == 0 {
            return Err(DecodeError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true for a constructed waveform; here for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}
