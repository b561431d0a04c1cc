use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::scratch::ScratchSpace;
use crate::source::AudioSource;
use audio_fingerprint::{Fingerprinter, SongFingerprint};
use music_primitives::SimilarityScore;
use waveform_loader::{load_path, LoadOptions};

/// Load → (tempo, spectral) → score, with every staged file confined to a
/// scratch space that is gone by the time a call returns.
pub struct SimilarityPipeline {
    config: PipelineConfig,
    load: LoadOptions,
    fingerprinter: Fingerprinter,
}

impl SimilarityPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            load: config.load_options(),
            fingerprinter: Fingerprinter::new(config.fingerprint)?,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn fingerprint(&self, source: &dyn AudioSource) -> Result<SongFingerprint, PipelineError> {
        let scratch = self.scratch()?;
        let fingerprint = self.fingerprint_in(&scratch, source)?;
        scratch.close();
        Ok(fingerprint)
    }

    /// Score two sources. Either failing fails the whole comparison.
    pub fn compare(&self, a: &dyn AudioSource, b: &dyn AudioSource) -> Result<SimilarityScore, PipelineError> {
        let scratch = self.scratch()?;
        let left = self.fingerprint_in(&scratch, a)?;
        let right = self.fingerprint_in(&scratch, b)?;
        let score = self.score(&left, &right)?;
        scratch.close();

        tracing::info!("{} vs {}: {}", a.describe(), b.describe(), score);
        Ok(score)
    }

    pub fn score(&self, left: &SongFingerprint, right: &SongFingerprint) -> Result<SimilarityScore, PipelineError> {
        Ok(self.fingerprinter.compare(left, right)?)
    }

    fn scratch(&self) -> Result<ScratchSpace, PipelineError> {
        ScratchSpace::create(self.config.scratch_root.as_deref())
    }

    fn fingerprint_in(&self, scratch: &ScratchSpace, source: &dyn AudioSource) -> Result<SongFingerprint, PipelineError> {
        let path = source.stage(scratch)?;
        tracing::debug!("Decoding {} from {:?}", source.describe(), path);

        let waveform = load_path(&path, &self.load)?;
        Ok(self.fingerprinter.fingerprint(&waveform)?)
    }
}
