//! Song fingerprints (tempo plus a spectral descriptor) and the similarity
//! score between two of them.
//!
//! ```no_run
//! # use audio_fingerprint::{Fingerprinter, FingerprintConfig, FingerprintError};
//! # use waveform_loader::{load_path, LoadOptions};
//! let fingerprinter = Fingerprinter::new(FingerprintConfig::default())?;
//! let options = LoadOptions::default();
//! let a = fingerprinter.fingerprint(&load_path("answer.mp3", &options)?)?;
//! let b = fingerprinter.fingerprint(&load_path("cover.mp3", &options)?)?;
//! println!("similarity {}", fingerprinter.compare(&a, &b)?);
//! # Ok::<(), FingerprintError>(())
//! ```

mod config;
mod error;
mod similarity;
pub mod spectral;
mod spectrogram;
mod tempo;
mod types;

pub use config::{
    FingerprintConfig, FrameConfig, SimilarityConfig, SpectralVariant, SpectrumSource, TempoConfig,
    TimeReduction, DEFAULT_CEPSTRAL_COEFFICIENTS, DEFAULT_MEL_BANDS, DEFAULT_SPECTRAL_WEIGHT,
};
pub use error::{ConfigError, FingerprintError, Operand};
pub use similarity::{cosine_similarity, SimilarityScorer};
pub use spectral::{extractor_for, SpectralExtractor};
pub use tempo::TempoEstimator;
pub use types::{Representation, SongFingerprint, SpectralDescriptor};

use music_primitives::SimilarityScore;
use waveform_loader::Waveform;

/// Computes fingerprints and scores them under one configuration
pub struct Fingerprinter {
    tempo: TempoEstimator,
    spectral: Box<dyn SpectralExtractor>,
    scorer: SimilarityScorer,
}

impl std::fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fingerprinter")
            .field("scorer", &self.scorer)
            .finish_non_exhaustive()
    }
}

impl Fingerprinter {
    pub fn new(config: FingerprintConfig) -> Result<Self, FingerprintError> {
        config.validate()?;
        Ok(Self {
            tempo: TempoEstimator::new(&config.frame, config.mel_bands, config.tempo),
            spectral: extractor_for(&config),
            scorer: SimilarityScorer::new(config.similarity),
        })
    }

    pub fn representation(&self) -> Representation {
        self.spectral.representation()
    }

    pub fn fingerprint(&self, waveform: &Waveform) -> Result<SongFingerprint, FingerprintError> {
        let tempo = self.tempo.estimate(waveform)?;
        let spectral = self.spectral.extract(waveform)?;
        tracing::debug!(
            "Fingerprinted {:.1}s clip (peak {:.3}): tempo {}, {}",
            waveform.duration().as_secs_f64(),
            waveform.peak(),
            tempo,
            spectral.representation()
        );
        Ok(SongFingerprint::new(tempo, spectral))
    }

    pub fn compare(&self, left: &SongFingerprint, right: &SongFingerprint) -> Result<SimilarityScore, FingerprintError> {
        self.scorer.score(left, right)
    }
}
