use crate::config::SimilarityConfig;
use crate::error::{FingerprintError, Operand};
use crate::types::{SongFingerprint, SpectralDescriptor};
use music_primitives::SimilarityScore;

/// Blends spectral cosine similarity with tempo proximity:
/// `(W * cos + 1 / (1 + |Δtempo|)) / (W + 1)`
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    spectral_weight: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(SimilarityConfig::default())
    }
}

impl SimilarityScorer {
    pub fn new(config: SimilarityConfig) -> Self {
        Self {
            spectral_weight: config.spectral_weight,
        }
    }

    pub fn score(&self, left: &SongFingerprint, right: &SongFingerprint) -> Result<SimilarityScore, FingerprintError> {
        let spectral = cosine_similarity(left.spectral(), right.spectral())?;
        let tempo = left.tempo().proximity(right.tempo());

        tracing::debug!(
            "Tempo difference {:.2} BPM, spectral cosine {:.5}",
            left.tempo().distance(right.tempo()),
            spectral
        );

        let w = self.spectral_weight;
        Ok(SimilarityScore::clamped((w * spectral + tempo) / (w + 1.0))?)
    }
}

/// Cosine of the angle between two descriptors, clamped to [0, 1].
///
/// Descriptors must share a representation and length; a zero or non-finite
/// magnitude on either side is reported rather than producing NaN.
pub fn cosine_similarity(left: &SpectralDescriptor, right: &SpectralDescriptor) -> Result<f64, FingerprintError> {
    if left.representation() != right.representation() || left.len() != right.len() {
        return Err(FingerprintError::ShapeMismatch {
            left: left.representation(),
            left_len: left.len(),
            right: right.representation(),
            right_len: right.len(),
        });
    }

    let left_norm = left.magnitude();
    if left_norm == 0.0 || !left_norm.is_finite() {
        return Err(FingerprintError::DegenerateVector(Operand::Left));
    }
    let right_norm = right.magnitude();
    if right_norm == 0.0 || !right_norm.is_finite() {
        return Err(FingerprintError::DegenerateVector(Operand::Right));
    }

    let dot: f64 = left
        .values()
        .iter()
        .zip(right.values())
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum();

    Ok((dot / (left_norm * right_norm)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SpectrumSource, TimeReduction};
    use crate::types::Representation;
    use assert_matches::assert_matches;
    use music_primitives::Tempo;
    use rstest::rstest;

    const REPR: Representation = Representation::Cepstral {
        coefficients: 3,
        reduction: TimeReduction::Mean,
    };

    fn fingerprint(bpm: f64, values: [f32; 3]) -> SongFingerprint {
        SongFingerprint::new(
            Tempo::from_bpm(bpm).unwrap(),
            SpectralDescriptor::new(REPR, values.to_vec()).unwrap(),
        )
    }

    #[test]
    fn identical_fingerprints_score_one() {
        let a = fingerprint(120.0, [1.0, 2.0, 3.0]);
        let score = SimilarityScorer::default().score(&a, &a).unwrap();
        assert!((score.value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn score_is_symmetric() {
        let a = fingerprint(120.0, [1.0, 2.0, 3.0]);
        let b = fingerprint(97.5, [3.0, 0.5, 1.0]);
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.score(&a, &b).unwrap(), scorer.score(&b, &a).unwrap());
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(1.0, 0.5)]
    #[case(9.0, 0.1)]
    fn tempo_term_with_orthogonal_spectra(#[case] difference: f64, #[case] tempo_term: f64) {
        let a = fingerprint(100.0, [1.0, 0.0, 0.0]);
        let b = fingerprint(100.0 + difference, [0.0, 1.0, 0.0]);
        let score = SimilarityScorer::default().score(&a, &b).unwrap();
        assert!((score.value() - tempo_term / 21.0).abs() < 1e-12);
    }

    #[test]
    fn weight_balances_the_terms() {
        // cos = 1, tempo term = 0.5
        let a = fingerprint(100.0, [1.0, 1.0, 0.0]);
        let b = fingerprint(101.0, [2.0, 2.0, 0.0]);
        let scorer = SimilarityScorer::new(SimilarityConfig { spectral_weight: 1.0 });
        assert!((scorer.score(&a, &b).unwrap().value() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn negative_cosine_clamps_to_zero() {
        let a = fingerprint(100.0, [1.0, 0.0, 0.0]);
        let b = fingerprint(100.0, [-1.0, 0.0, 0.0]);
        assert_eq!(cosine_similarity(a.spectral(), b.spectral()).unwrap(), 0.0);
    }

    #[test]
    fn zero_descriptor_is_degenerate() {
        let a = fingerprint(100.0, [1.0, 0.0, 0.0]);
        let zero = fingerprint(100.0, [0.0, 0.0, 0.0]);
        let scorer = SimilarityScorer::default();

        assert_matches!(
            scorer.score(&zero, &a),
            Err(FingerprintError::DegenerateVector(Operand::Left))
        );
        assert_matches!(
            scorer.score(&a, &zero),
            Err(FingerprintError::DegenerateVector(Operand::Right))
        );
    }

    #[test]
    fn non_finite_descriptor_is_degenerate() {
        let a = fingerprint(100.0, [1.0, 0.0, 0.0]);
        let broken = fingerprint(100.0, [f32::NAN, 0.0, 0.0]);
        assert_matches!(
            cosine_similarity(a.spectral(), broken.spectral()),
            Err(FingerprintError::DegenerateVector(Operand::Right))
        );
    }

    #[test]
    fn different_representations_do_not_compare() {
        let a = fingerprint(100.0, [1.0, 0.0, 0.0]);
        let mel = Representation::MelStatistics {
            bands: 2,
            source: SpectrumSource::Power,
        };
        let b = SongFingerprint::new(
            Tempo::from_bpm(100.0).unwrap(),
            SpectralDescriptor::new(mel, vec![1.0; 4]).unwrap(),
        );

        assert_matches!(
            SimilarityScorer::default().score(&a, &b),
            Err(FingerprintError::ShapeMismatch {
                left_len: 3,
                right_len: 4,
                ..
            })
        );
    }
}
