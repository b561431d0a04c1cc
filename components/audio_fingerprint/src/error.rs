use crate::types::Representation;
use music_primitives::{ScoreError, TempoError};
use std::fmt;
use thiserror::Error;
use waveform_loader::DecodeError;

/// Which side of a comparison an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Left,
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Left => write!(f, "left"),
            Operand::Right => write!(f, "right"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Audio decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error(
        "Descriptor shape mismatch: {left} ({left_len} values) vs {right} ({right_len} values)"
    )]
    ShapeMismatch {
        left: Representation,
        left_len: usize,
        right: Representation,
        right_len: usize,
    },

    #[error("The {0} descriptor has zero magnitude, cosine similarity is undefined")]
    DegenerateVector(Operand),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid tempo estimate: {0}")]
    Tempo(#[from] TempoError),

    #[error("Invalid similarity score: {0}")]
    Score(#[from] ScoreError),

    #[error("Spectral transform failed: {0}")]
    Transform(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("FFT size must be at least 2, got {0}")]
    FftSize(usize),

    #[error("Hop size {hop_size} must be between 1 and the FFT size {fft_size}")]
    HopSize { hop_size: usize, fft_size: usize },

    #[error("Mel band count must be non-zero")]
    ZeroBands,

    #[error("Cepstral coefficient count {coefficients} must be between 1 and the band count {bands}")]
    Coefficients { coefficients: usize, bands: usize },

    #[error("Tempo search range {min}..{max} BPM is invalid")]
    TempoRange { min: f64, max: f64 },

    #[error("Tempo prior ({bpm} BPM, {octaves} octaves) must be positive and finite")]
    TempoPrior { bpm: f64, octaves: f64 },

    #[error("Spectral weight must be finite and non-negative, got {0}")]
    Weight(f64),
}
