use crate::error::ConfigError;
use crate::types::Representation;
use serde::{Deserialize, Serialize};

/// Spectral similarity outweighs tempo proximity by this factor by default.
/// Chosen empirically; override through `SimilarityConfig`.
pub const DEFAULT_SPECTRAL_WEIGHT: f64 = 20.0;

pub const DEFAULT_MEL_BANDS: usize = 128;
pub const DEFAULT_CEPSTRAL_COEFFICIENTS: usize = 13;

/// Short-time framing shared by every spectral stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub fft_size: usize,
    pub hop_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub min_bpm: f64,
    pub max_bpm: f64,
    /// Centre of the log-normal tempo prior
    pub prior_bpm: f64,
    /// Width of the prior in octaves
    pub prior_octaves: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            min_bpm: 30.0,
            max_bpm: 300.0,
            prior_bpm: 120.0,
            prior_octaves: 1.0,
        }
    }
}

/// Which spectrum feeds the mel statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumSource {
    /// Full power spectrum
    #[default]
    Power,
    /// Only pitch-salient spectral peaks
    PitchSalience,
}

/// How a (coefficients x frames) cepstral matrix is collapsed over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeReduction {
    Mean,
    #[default]
    MeanVariance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum SpectralVariant {
    /// Per-band mean and variance of a mel spectrogram
    MelStatistics {
        #[serde(default)]
        source: SpectrumSource,
    },
    /// Cepstral coefficients reduced over time
    Cepstral {
        coefficients: usize,
        #[serde(default)]
        reduction: TimeReduction,
    },
}

impl Default for SpectralVariant {
    fn default() -> Self {
        SpectralVariant::MelStatistics {
            source: SpectrumSource::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Weight W in `(W * spectral + tempo) / (W + 1)`
    pub spectral_weight: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            spectral_weight: DEFAULT_SPECTRAL_WEIGHT,
        }
    }
}

/// Everything that determines a fingerprint. Two fingerprints are only
/// comparable when they were produced with the same configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    pub frame: FrameConfig,
    pub mel_bands: usize,
    pub spectral: SpectralVariant,
    pub tempo: TempoConfig,
    pub similarity: SimilarityConfig,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            mel_bands: DEFAULT_MEL_BANDS,
            spectral: SpectralVariant::default(),
            tempo: TempoConfig::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl FingerprintConfig {
    /// Descriptor representation this configuration produces
    pub fn representation(&self) -> Representation {
        match self.spectral {
            SpectralVariant::MelStatistics { source } => Representation::MelStatistics {
                bands: self.mel_bands,
                source,
            },
            SpectralVariant::Cepstral {
                coefficients,
                reduction,
            } => Representation::Cepstral {
                coefficients,
                reduction,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let FrameConfig { fft_size, hop_size } = self.frame;
        if fft_size < 2 {
            return Err(ConfigError::FftSize(fft_size));
        }
        if hop_size == 0 || hop_size > fft_size {
            return Err(ConfigError::HopSize { hop_size, fft_size });
        }
        if self.mel_bands == 0 {
            return Err(ConfigError::ZeroBands);
        }

        if let SpectralVariant::Cepstral { coefficients, .. } = self.spectral {
            if coefficients == 0 || coefficients > self.mel_bands {
                return Err(ConfigError::Coefficients {
                    coefficients,
                    bands: self.mel_bands,
                });
            }
        }

        let tempo = &self.tempo;
        if !(tempo.min_bpm > 0.0 && tempo.min_bpm < tempo.max_bpm && tempo.max_bpm.is_finite()) {
            return Err(ConfigError::TempoRange {
                min: tempo.min_bpm,
                max: tempo.max_bpm,
            });
        }
        if !(tempo.prior_bpm > 0.0 && tempo.prior_bpm.is_finite())
            || !(tempo.prior_octaves > 0.0 && tempo.prior_octaves.is_finite())
        {
            return Err(ConfigError::TempoPrior {
                bpm: tempo.prior_bpm,
                octaves: tempo.prior_octaves,
            });
        }

        let weight = self.similarity.spectral_weight;
        if !(weight >= 0.0 && weight.is_finite()) {
            return Err(ConfigError::Weight(weight));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_are_valid() {
        assert!(FingerprintConfig::default().validate().is_ok());
    }

    #[test]
    fn default_descriptor_is_mean_and_variance_of_128_bands() {
        let representation = FingerprintConfig::default().representation();
        assert_eq!(representation.descriptor_len(), 256);
    }

    #[test]
    fn hop_larger_than_frame_is_rejected() {
        let config = FingerprintConfig {
            frame: FrameConfig {
                fft_size: 512,
                hop_size: 1024,
            },
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(ConfigError::HopSize { .. }));
    }

    #[test]
    fn more_coefficients_than_bands_is_rejected() {
        let config = FingerprintConfig {
            mel_bands: 10,
            spectral: SpectralVariant::Cepstral {
                coefficients: 13,
                reduction: TimeReduction::Mean,
            },
            ..Default::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::Coefficients {
                coefficients: 13,
                bands: 10
            })
        );
    }

    #[test]
    fn negative_weight_is_rejected() {
        let config = FingerprintConfig {
            similarity: SimilarityConfig {
                spectral_weight: -1.0,
            },
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(ConfigError::Weight(_)));
    }

    #[test]
    fn inverted_tempo_range_is_rejected() {
        let config = FingerprintConfig {
            tempo: TempoConfig {
                min_bpm: 200.0,
                max_bpm: 100.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(ConfigError::TempoRange { .. }));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{
            "spectral": { "variant": "cepstral", "coefficients": 20 },
            "similarity": { "spectral_weight": 5.0 }
        }"#;
        let config: FingerprintConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.frame, FrameConfig::default());
        assert_eq!(config.similarity.spectral_weight, 5.0);
        assert_eq!(
            config.spectral,
            SpectralVariant::Cepstral {
                coefficients: 20,
                reduction: TimeReduction::MeanVariance
            }
        );
    }
}
