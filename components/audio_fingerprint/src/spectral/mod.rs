//! Spectral descriptors. Each variant reduces a clip to a fixed-length
//! vector whose length depends only on the configuration.

mod cepstral;
mod mel_stats;

pub use cepstral::{CepstralExtractor, CepstralMatrix};
pub use mel_stats::MelStatisticsExtractor;

use crate::config::{FingerprintConfig, SpectralVariant};
use crate::error::FingerprintError;
use crate::types::{Representation, SpectralDescriptor};
use waveform_loader::Waveform;

pub trait SpectralExtractor: Send + Sync {
    /// Representation of every descriptor this extractor produces
    fn representation(&self) -> Representation;

    fn extract(&self, waveform: &Waveform) -> Result<SpectralDescriptor, FingerprintError>;
}

/// Build the extractor selected by `config.spectral`
pub fn extractor_for(config: &FingerprintConfig) -> Box<dyn SpectralExtractor> {
    match config.spectral {
        SpectralVariant::MelStatistics { source } => {
            Box::new(MelStatisticsExtractor::new(&config.frame, config.mel_bands, source))
        }
        SpectralVariant::Cepstral {
            coefficients,
            reduction,
        } => Box::new(CepstralExtractor::new(
            &config.frame,
            config.mel_bands,
            coefficients,
            reduction,
        )),
    }
}

/// Per-row mean and population variance of a (frames x columns) matrix,
/// accumulated in f64.
pub(crate) fn column_statistics(rows: &[Vec<f32>], columns: usize) -> (Vec<f32>, Vec<f32>) {
    let count = rows.len().max(1) as f64;
    let mut sum = vec![0.0f64; columns];
    let mut sum_sq = vec![0.0f64; columns];

    for row in rows {
        for (i, &v) in row.iter().enumerate().take(columns) {
            let v = v as f64;
            sum[i] += v;
            sum_sq[i] += v * v;
        }
    }

    let mean: Vec<f64> = sum.iter().map(|s| s / count).collect();
    let variance = sum_sq
        .iter()
        .zip(&mean)
        .map(|(sq, m)| (sq / count - m * m).max(0.0) as f32)
        .collect();

    (mean.into_iter().map(|m| m as f32).collect(), variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SpectrumSource, TimeReduction};

    #[test]
    fn statistics_per_column() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let (mean, variance) = column_statistics(&rows, 2);
        assert_eq!(mean, vec![2.0, 10.0]);
        assert_eq!(variance, vec![1.0, 0.0]);
    }

    #[test]
    fn extractor_matches_configured_representation() {
        let config = FingerprintConfig {
            spectral: SpectralVariant::Cepstral {
                coefficients: 20,
                reduction: TimeReduction::Mean,
            },
            ..Default::default()
        };
        assert_eq!(extractor_for(&config).representation(), config.representation());

        let config = FingerprintConfig {
            spectral: SpectralVariant::MelStatistics {
                source: SpectrumSource::PitchSalience,
            },
            ..Default::default()
        };
        assert_eq!(extractor_for(&config).representation(), config.representation());
    }
}
