use audio_fingerprint::{ConfigError, FingerprintError};
use std::time::Duration;
use thiserror::Error;
use waveform_loader::DecodeError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Could not stage {clip}: {reason}")]
    Source { clip: String, reason: String },

    #[error("Scratch space error: {0}")]
    Scratch(#[source] std::io::Error),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not read configuration file: {0}")]
    ConfigFile(String),

    #[error("max_duration_secs must be positive and finite, got {0}")]
    MaxDuration(f64),

    #[error("Analysis was cancelled")]
    Cancelled,

    #[error("Analysis timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

impl From<DecodeError> for PipelineError {
    fn from(error: DecodeError) -> Self {
        PipelineError::Fingerprint(FingerprintError::Decode(error))
    }
}

impl PipelineError {
    pub(crate) fn staging(clip: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::Source {
            clip: clip.into(),
            reason: reason.to_string(),
        }
    }
}
