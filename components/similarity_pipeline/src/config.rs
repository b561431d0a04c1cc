use crate::error::PipelineError;
use audio_fingerprint::FingerprintConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use waveform_loader::{LoadOptions, SampleRatePolicy, DEFAULT_MAX_DURATION};

/// Everything that has to be identical across one comparison population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sample_rate: SampleRatePolicy,

    /// Decode at most this many seconds of each clip; `null` decodes all
    pub max_duration_secs: Option<f64>,

    pub fingerprint: FingerprintConfig,

    /// Where scratch directories are created; the system temp dir if unset
    pub scratch_root: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRatePolicy::default(),
            max_duration_secs: Some(DEFAULT_MAX_DURATION.as_secs_f64()),
            fingerprint: FingerprintConfig::default(),
            scratch_root: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::ConfigFile(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {:?}", path);
        let json = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::ConfigFile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if let Some(secs) = self.max_duration_secs {
            if !(secs > 0.0 && secs.is_finite()) {
                return Err(PipelineError::MaxDuration(secs));
            }
        }
        self.fingerprint.validate()?;
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sample_rate: self.sample_rate,
            max_duration: self.max_duration_secs.map(Duration::from_secs_f64),
        }
    }
}
