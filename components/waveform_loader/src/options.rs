use crate::error::DecodeError;
use crate::resample::resample_mono;
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate the analysis stages are tuned for (librosa's default load rate)
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Longest clip decoded by default; previews are around 30 seconds
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(60);

/// What to do when a clip's decoded rate differs from the analysis rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SampleRatePolicy {
    /// Convert every clip to `target_hz`
    Resample { target_hz: u32 },
    /// Fail on any clip not already at `expected_hz`
    Reject { expected_hz: u32 },
    /// Keep whatever rate the container declares
    Native,
}

impl Default for SampleRatePolicy {
    fn default() -> Self {
        SampleRatePolicy::Resample {
            target_hz: ANALYSIS_SAMPLE_RATE,
        }
    }
}

impl SampleRatePolicy {
    pub fn apply(&self, waveform: Waveform) -> Result<Waveform, DecodeError> {
        match *self {
            SampleRatePolicy::Native => Ok(waveform),
            SampleRatePolicy::Reject { expected_hz } => {
                if waveform.sample_rate() == expected_hz {
                    Ok(waveform)
                } else {
                    Err(DecodeError::SampleRateMismatch {
                        expected: expected_hz,
                        found: waveform.sample_rate(),
                    })
                }
            }
            SampleRatePolicy::Resample { target_hz } => {
                if target_hz == 0 {
                    return Err(DecodeError::InvalidSampleRate(target_hz));
                }
                if waveform.sample_rate() == target_hz {
                    return Ok(waveform);
                }
                let samples = resample_mono(waveform.samples(), waveform.sample_rate(), target_hz)?;
                Waveform::new(samples, target_hz)
            }
        }
    }
}

/// Decoding options shared by every clip in one comparison population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub sample_rate: SampleRatePolicy,

    /// Stop decoding after this much audio; `None` decodes everything
    pub max_duration: Option<Duration>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sample_rate: SampleRatePolicy::default(),
            max_duration: Some(DEFAULT_MAX_DURATION),
        }
    }
}
