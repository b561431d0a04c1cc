//! Decodes short audio clips into mono waveforms for analysis.

mod decode;
mod error;
mod options;
mod resample;
mod waveform;

pub use decode::{load_bytes, load_path, load_reader};
pub use error::DecodeError;
pub use options::{LoadOptions, SampleRatePolicy, ANALYSIS_SAMPLE_RATE, DEFAULT_MAX_DURATION};
pub use resample::resample_mono;
pub use waveform::Waveform;
