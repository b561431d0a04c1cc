//! Short-time power spectra and mel projection shared by the tempo and
//! spectral stages.

use crate::config::FrameConfig;
use crate::error::FingerprintError;
use realfft::{RealFftPlanner, RealToComplex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Power below this is treated as silence when converting to decibels
pub const POWER_FLOOR: f32 = 1e-10;

/// Dynamic range kept below the loudest cell of a decibel spectrogram
pub const TOP_DB: f32 = 80.0;

/// One row per frame, one column per frequency bin or band
pub type Spectrogram = Vec<Vec<f32>>;

#[derive(Clone)]
pub struct Stft {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    fft_size: usize,
    hop_size: usize,
}

impl Stft {
    pub fn new(frame: &FrameConfig) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame.fft_size);
        Self {
            fft,
            window: hann_window(frame.fft_size),
            fft_size: frame.fft_size,
            hop_size: frame.hop_size,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Frames are not centred; a clip shorter than one frame yields a single
    /// zero-padded frame.
    pub fn frame_count(&self, samples: usize) -> usize {
        if samples <= self.fft_size {
            1
        } else {
            (samples - self.fft_size) / self.hop_size + 1
        }
    }

    /// Squared-magnitude spectrum of every Hann-windowed frame
    pub fn power(&self, samples: &[f32]) -> Result<Spectrogram, FingerprintError> {
        let frame_count = self.frame_count(samples.len());
        let mut input = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut frames = Vec::with_capacity(frame_count);

        for frame_index in 0..frame_count {
            let start = frame_index * self.hop_size;
            for (i, slot) in input.iter_mut().enumerate() {
                *slot = samples.get(start + i).copied().unwrap_or(0.0) * self.window[i];
            }

            self.fft
                .process(&mut input, &mut spectrum)
                .map_err(|e| FingerprintError::Transform(e.to_string()))?;

            frames.push(spectrum.iter().map(|c| c.norm_sqr()).collect());
        }

        Ok(frames)
    }
}

/// A triangular filter stored as its non-zero span
#[derive(Debug, Clone)]
struct MelFilter {
    start: usize,
    weights: Vec<f32>,
}

/// Triangular mel-scale filters spanning 0 Hz to Nyquist
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    filters: Vec<MelFilter>,
}

impl MelFilterBank {
    pub fn new(bands: usize, fft_size: usize, sample_rate: u32) -> Self {
        let bins = fft_size / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;
        let mel_max = hz_to_mel(nyquist);

        let edges: Vec<f32> = (0..bands + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (bands + 1) as f32))
            .collect();
        let bin_hz = sample_rate as f32 / fft_size as f32;

        let filters = (0..bands)
            .map(|band| {
                let (left, centre, right) = (edges[band], edges[band + 1], edges[band + 2]);
                let weights: Vec<(usize, f32)> = (0..bins)
                    .filter_map(|bin| {
                        let hz = bin as f32 * bin_hz;
                        let rising = (hz - left) / (centre - left);
                        let falling = (right - hz) / (right - centre);
                        let weight = rising.min(falling);
                        (weight > 0.0).then_some((bin, weight))
                    })
                    .collect();

                match weights.first() {
                    Some(&(start, _)) => MelFilter {
                        start,
                        weights: weights.into_iter().map(|(_, w)| w).collect(),
                    },
                    None => MelFilter {
                        start: 0,
                        weights: Vec::new(),
                    },
                }
            })
            .collect();

        Self { filters }
    }

    pub fn bands(&self) -> usize {
        self.filters.len()
    }

    /// Project one power spectrum onto the mel bands
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|filter| {
                power[filter.start..]
                    .iter()
                    .zip(&filter.weights)
                    .map(|(p, w)| p * w)
                    .sum()
            })
            .collect()
    }

    pub fn project(&self, spectrogram: &[Vec<f32>]) -> Spectrogram {
        spectrogram.iter().map(|frame| self.apply(frame)).collect()
    }
}

/// Convert a power spectrogram to decibels in place, flooring at
/// `TOP_DB` below its loudest cell.
pub fn power_to_db(spectrogram: &mut [Vec<f32>]) {
    let mut max_db = f32::NEG_INFINITY;
    for value in spectrogram.iter_mut().flatten() {
        *value = 10.0 * value.max(POWER_FLOOR).log10();
        max_db = max_db.max(*value);
    }

    let floor = max_db - TOP_DB;
    for value in spectrogram.iter_mut().flatten() {
        *value = value.max(floor);
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / (size as f32 - 1.0);
            0.5 * (1.0 - angle.cos())
        })
        .collect()
}

pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}
