use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported audio format: {0}")]
    Unsupported(String),

    #[error("No decodable audio track found")]
    NoTrack,

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Audio decoded to an empty waveform")]
    Empty,

    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("Sample rate {found} Hz does not match expected {expected} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("Resampling failed: {0}")]
    Resample(String),
}
