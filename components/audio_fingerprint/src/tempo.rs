//! Global tempo estimation.
//!
//! An onset-strength envelope (positive spectral flux of a decibel mel
//! spectrogram) is autocorrelated, and the lag with the strongest
//! periodicity under a log-normal tempo prior is reported as BPM.

use crate::config::{FrameConfig, TempoConfig};
use crate::error::FingerprintError;
use crate::spectrogram::{power_to_db, MelFilterBank, Stft};
use music_primitives::Tempo;
use waveform_loader::{DecodeError, Waveform};

/// Envelope energy below this is treated as "no pulse"
const SILENCE_EPSILON: f32 = 1e-6;

pub struct TempoEstimator {
    stft: Stft,
    mel_bands: usize,
    config: TempoConfig,
}

impl TempoEstimator {
    pub fn new(frame: &FrameConfig, mel_bands: usize, config: TempoConfig) -> Self {
        Self {
            stft: Stft::new(frame),
            mel_bands,
            config,
        }
    }

    pub fn estimate(&self, waveform: &Waveform) -> Result<Tempo, FingerprintError> {
        self.estimate_samples(waveform.samples(), waveform.sample_rate())
    }

    /// Estimate from raw mono samples. Empty input is a decode error, not a
    /// zero tempo.
    pub fn estimate_samples(&self, samples: &[f32], sample_rate: u32) -> Result<Tempo, FingerprintError> {
        if samples.is_empty() {
            return Err(DecodeError::Empty.into());
        }
        if sample_rate == 0 {
            return Err(DecodeError::InvalidSampleRate(sample_rate).into());
        }

        let envelope = self.onset_envelope(samples, sample_rate)?;
        let frame_rate = sample_rate as f64 / self.stft.hop_size() as f64;

        match self.dominant_lag(&envelope, frame_rate) {
            Some(lag) => {
                let bpm = 60.0 * frame_rate / lag;
                tracing::debug!("Estimated tempo {:.2} BPM (lag {:.2} frames)", bpm, lag);
                Ok(Tempo::from_bpm(bpm)?)
            }
            None => {
                tracing::debug!("No periodic onsets found, reporting zero tempo");
                Ok(Tempo::ZERO)
            }
        }
    }

    /// Onset strength per frame, lightly smoothed
    pub fn onset_envelope(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>, FingerprintError> {
        let bank = MelFilterBank::new(self.mel_bands, self.stft.fft_size(), sample_rate);
        let mut mel = bank.project(&self.stft.power(samples)?);
        power_to_db(&mut mel);

        let mut flux = Vec::with_capacity(mel.len());
        flux.push(0.0f32);
        for pair in mel.windows(2) {
            let rise: f32 = pair[1]
                .iter()
                .zip(&pair[0])
                .map(|(now, before)| (now - before).max(0.0))
                .sum();
            flux.push(rise / self.mel_bands as f32);
        }

        Ok(smooth(&flux))
    }

    /// Fractional lag (in frames) of the strongest weighted periodicity
    fn dominant_lag(&self, envelope: &[f32], frame_rate: f64) -> Option<f64> {
        if envelope.iter().all(|&v| v <= SILENCE_EPSILON) {
            return None;
        }

        let n = envelope.len();
        let mean = envelope.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        let centred: Vec<f64> = envelope.iter().map(|&v| v as f64 - mean).collect();

        let min_lag = ((60.0 * frame_rate / self.config.max_bpm).floor() as usize).max(1);
        let max_lag = ((60.0 * frame_rate / self.config.min_bpm).ceil() as usize).min(n.saturating_sub(1));
        if min_lag >= max_lag {
            return None;
        }

        let weighted: Vec<f64> = (min_lag..=max_lag)
            .map(|lag| {
                let acf = centred
                    .iter()
                    .zip(&centred[lag..])
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / (n - lag) as f64;
                acf.max(0.0) * self.prior(60.0 * frame_rate / lag as f64)
            })
            .collect();

        // First maximum wins so ties resolve deterministically
        let (best, best_value) = weighted
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &w)| {
                if w > best.1 {
                    (i, w)
                } else {
                    best
                }
            });
        if best_value <= 0.0 {
            return None;
        }

        Some(min_lag as f64 + best as f64 + parabolic_offset(&weighted, best))
    }

    fn prior(&self, bpm: f64) -> f64 {
        let octaves = (bpm / self.config.prior_bpm).log2() / self.config.prior_octaves;
        (-0.5 * octaves * octaves).exp()
    }
}

/// Sub-frame refinement of a peak from its two neighbours
fn parabolic_offset(values: &[f64], peak: usize) -> f64 {
    if peak == 0 || peak + 1 >= values.len() {
        return 0.0;
    }
    let (a, b, c) = (values[peak - 1], values[peak], values[peak + 1]);
    let denominator = a - 2.0 * b + c;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    let offset = 0.5 * (a - c) / denominator;
    if offset.abs() < 1.0 {
        offset
    } else {
        0.0
    }
}

/// 3-tap triangular smoothing; edges reuse the nearest sample
fn smooth(values: &[f32]) -> Vec<f32> {
    let last = values.len().saturating_sub(1);
    (0..values.len())
        .map(|i| {
            let before = values[i.saturating_sub(1)];
            let after = values[(i + 1).min(last)];
            0.25 * before + 0.5 * values[i] + 0.25 * after
        })
        .collect()
}
