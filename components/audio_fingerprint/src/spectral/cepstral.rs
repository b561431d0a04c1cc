use super::{column_statistics, SpectralExtractor};
use crate::config::{FrameConfig, TimeReduction};
use crate::error::FingerprintError;
use crate::spectrogram::{power_to_db, MelFilterBank, Stft, POWER_FLOOR};
use crate::types::{Representation, SpectralDescriptor};
use std::f64::consts::PI;
use waveform_loader::Waveform;

/// Cepstral coefficients over time, one row per frame
#[derive(Debug, Clone, PartialEq)]
pub struct CepstralMatrix {
    coefficients: usize,
    frames: Vec<Vec<f32>>,
}

impl CepstralMatrix {
    pub fn coefficients(&self) -> usize {
        self.coefficients
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Coefficient vector of one frame
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// Every value of one coefficient over time
    pub fn coefficient(&self, index: usize) -> Vec<f32> {
        self.frames.iter().map(|frame| frame[index]).collect()
    }

    pub fn reduce(&self, reduction: TimeReduction) -> Vec<f32> {
        let (mut mean, variance) = column_statistics(&self.frames, self.coefficients);
        if reduction == TimeReduction::MeanVariance {
            mean.extend(variance);
        }
        mean
    }
}

/// Cepstral coefficients (DCT of the log mel spectrum) reduced over time
pub struct CepstralExtractor {
    stft: Stft,
    bands: usize,
    coefficients: usize,
    reduction: TimeReduction,
    dct: Vec<Vec<f32>>,
}

impl CepstralExtractor {
    pub fn new(frame: &FrameConfig, bands: usize, coefficients: usize, reduction: TimeReduction) -> Self {
        Self {
            stft: Stft::new(frame),
            bands,
            coefficients,
            reduction,
            dct: dct_basis(coefficients, bands),
        }
    }

    /// A clip with no mel power above the floor yields all-zero frames, so
    /// silence stays degenerate instead of becoming a flat log spectrum.
    pub fn coefficients(&self, waveform: &Waveform) -> Result<CepstralMatrix, FingerprintError> {
        let bank = MelFilterBank::new(self.bands, self.stft.fft_size(), waveform.sample_rate());
        let mut mel = bank.project(&self.stft.power(waveform.samples())?);

        if mel.iter().flatten().all(|&power| power <= POWER_FLOOR) {
            tracing::debug!("No mel power above the floor, emitting zero cepstrum");
            return Ok(CepstralMatrix {
                coefficients: self.coefficients,
                frames: vec![vec![0.0; self.coefficients]; mel.len()],
            });
        }
        power_to_db(&mut mel);

        let frames = mel
            .iter()
            .map(|bands| {
                self.dct
                    .iter()
                    .map(|basis| basis.iter().zip(bands).map(|(b, v)| b * v).sum::<f32>())
                    .collect::<Vec<f32>>()
            })
            .collect();

        Ok(CepstralMatrix {
            coefficients: self.coefficients,
            frames,
        })
    }
}

impl SpectralExtractor for CepstralExtractor {
    fn representation(&self) -> Representation {
        Representation::Cepstral {
            coefficients: self.coefficients,
            reduction: self.reduction,
        }
    }

    fn extract(&self, waveform: &Waveform) -> Result<SpectralDescriptor, FingerprintError> {
        let matrix = self.coefficients(waveform)?;
        tracing::debug!(
            "Cepstral matrix {} x {}",
            matrix.coefficients(),
            matrix.frame_count()
        );
        SpectralDescriptor::new(self.representation(), matrix.reduce(self.reduction))
    }
}

/// Orthonormal DCT-II rows, `coefficients` x `bands`
fn dct_basis(coefficients: usize, bands: usize) -> Vec<Vec<f32>> {
    let n = bands as f64;
    (0..coefficients)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..bands)
                .map(|i| (scale * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos()) as f32)
                .collect()
        })
        .collect()
}
