use super::{column_statistics, SpectralExtractor};
use crate::config::{FrameConfig, SpectrumSource};
use crate::error::FingerprintError;
use crate::spectrogram::{MelFilterBank, Spectrogram, Stft};
use crate::types::{Representation, SpectralDescriptor};
use waveform_loader::Waveform;

/// Frequency range searched for pitch-salient peaks
const SALIENCE_MIN_HZ: f32 = 150.0;
const SALIENCE_MAX_HZ: f32 = 4000.0;

/// Peaks weaker than this fraction of the frame's loudest magnitude are dropped
const SALIENCE_RELATIVE_THRESHOLD: f32 = 0.1;

/// Per-band mean followed by per-band variance of a mel spectrogram. The
/// `Power` source projects the full power spectrum; `PitchSalience` projects
/// only the magnitudes of pitch-salient peaks.
pub struct MelStatisticsExtractor {
    stft: Stft,
    bands: usize,
    source: SpectrumSource,
}

impl MelStatisticsExtractor {
    pub fn new(frame: &FrameConfig, bands: usize, source: SpectrumSource) -> Self {
        Self {
            stft: Stft::new(frame),
            bands,
            source,
        }
    }

    /// Mel spectrogram, one row per frame
    pub fn mel_spectrogram(&self, waveform: &Waveform) -> Result<Spectrogram, FingerprintError> {
        let mut spectrum = self.stft.power(waveform.samples())?;
        if self.source == SpectrumSource::PitchSalience {
            let bin_hz = waveform.sample_rate() as f32 / self.stft.fft_size() as f32;
            for frame in spectrum.iter_mut() {
                keep_salient_peaks(frame, bin_hz);
            }
        }

        let bank = MelFilterBank::new(self.bands, self.stft.fft_size(), waveform.sample_rate());
        Ok(bank.project(&spectrum))
    }
}

impl SpectralExtractor for MelStatisticsExtractor {
    fn representation(&self) -> Representation {
        Representation::MelStatistics {
            bands: self.bands,
            source: self.source,
        }
    }

    fn extract(&self, waveform: &Waveform) -> Result<SpectralDescriptor, FingerprintError> {
        let mel = self.mel_spectrogram(waveform)?;
        let (mut values, variance) = column_statistics(&mel, self.bands);
        values.extend(variance);

        tracing::debug!(
            "Mel statistics over {} frames, {} bands",
            mel.len(),
            self.bands
        );
        SpectralDescriptor::new(self.representation(), values)
    }
}

/// Turn a power frame into the magnitudes of its salient peaks: local
/// magnitude maxima inside the salience range and above the relative
/// threshold. Every other bin is zeroed.
fn keep_salient_peaks(frame: &mut [f32], bin_hz: f32) {
    let magnitude: Vec<f32> = frame.iter().map(|p| p.sqrt()).collect();
    let loudest = magnitude.iter().copied().fold(0.0f32, f32::max);
    let threshold = loudest * SALIENCE_RELATIVE_THRESHOLD;
    let last = magnitude.len().saturating_sub(1);

    for (bin, value) in frame.iter_mut().enumerate() {
        let hz = bin as f32 * bin_hz;
        let salient = loudest > 0.0
            && (SALIENCE_MIN_HZ..=SALIENCE_MAX_HZ).contains(&hz)
            && bin > 0
            && bin < last
            && magnitude[bin] > magnitude[bin - 1]
            && magnitude[bin] >= magnitude[bin + 1]
            && magnitude[bin] >= threshold;
        *value = if salient { magnitude[bin] } else { 0.0 };
    }
}
