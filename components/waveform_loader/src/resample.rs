use crate::error::DecodeError;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

/// Input frames handed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Resample mono audio with a band-limited sinc interpolator.
///
/// Content above the lower of the two Nyquist frequencies is filtered out
/// instead of folding back into the output band. The result is aligned with
/// the input and holds `len * target / src` samples (at least one).
pub fn resample_mono(samples: &[f32], src_rate: u32, target_rate: u32) -> Result<Vec<f32>, DecodeError> {
    for rate in [src_rate, target_rate] {
        if rate == 0 {
            return Err(DecodeError::InvalidSampleRate(rate));
        }
    }
    if src_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = target_rate as f64 / src_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_FRAMES, 1)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let expected = ((samples.len() as f64 * ratio).round() as usize).max(1);
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay + CHUNK_FRAMES);

    let mut chunks = samples.chunks_exact(CHUNK_FRAMES);
    for chunk in &mut chunks {
        let frames = resampler
            .process(&[chunk], None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let frames = resampler
            .process_partial(Some(&[remainder][..]), None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush what is still inside the filter
    while output.len() < expected + delay {
        let frames = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);

    tracing::debug!(
        "Resampled {} frames ({} Hz) to {} frames ({} Hz)",
        samples.len(),
        src_rate,
        output.len(),
        target_rate
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::f32::consts::PI;

    fn sine(freq: f32, rate: u32, seconds: f32) -> Vec<f32> {
        (0..(rate as f32 * seconds) as usize)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    /// RMS away from the edges, where a truncated sine has its transients
    fn interior_rms(samples: &[f32]) -> f32 {
        let interior = &samples[1_000..samples.len() - 1_000];
        (interior.iter().map(|s| s * s).sum::<f32>() / interior.len() as f32).sqrt()
    }

    #[test]
    fn same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_mono(&samples, 22_050, 22_050).unwrap(), samples);
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert_matches!(resample_mono(&[0.1], 0, 22_050), Err(DecodeError::InvalidSampleRate(0)));
        assert_matches!(resample_mono(&[0.1], 44_100, 0), Err(DecodeError::InvalidSampleRate(0)));
    }

    #[test]
    fn halving_the_rate_halves_the_length() {
        let out = resample_mono(&sine(440.0, 44_100, 1.0), 44_100, 22_050).unwrap();
        assert_eq!(out.len(), 22_050);
    }

    #[test]
    fn upsampling_scales_the_length() {
        let out = resample_mono(&sine(440.0, 16_000, 2.0), 16_000, 22_050).unwrap();
        assert_eq!(out.len(), 44_100);
    }

    #[test]
    fn tone_above_target_nyquist_is_removed() {
        let input = sine(15_000.0, 44_100, 1.0);
        let out = resample_mono(&input, 44_100, 22_050).unwrap();

        let ratio = interior_rms(&out) / interior_rms(&input);
        assert!(ratio < 0.01, "15 kHz leaked through at {:.1} dB", 20.0 * ratio.log10());
    }

    #[test]
    fn in_band_tone_keeps_level_and_phase() {
        let out = resample_mono(&sine(100.0, 44_100, 1.0), 44_100, 22_050).unwrap();
        let reference = sine(100.0, 22_050, 1.0);

        let ratio = interior_rms(&out) / interior_rms(&reference);
        assert!((ratio - 1.0).abs() < 0.05, "level ratio {}", ratio);

        for i in (1_000..21_000).step_by(97) {
            assert!(
                (out[i] - reference[i]).abs() < 0.05,
                "sample {}: {} vs {}",
                i,
                out[i],
                reference[i]
            );
        }
    }

    #[test]
    fn short_input_never_resamples_to_nothing() {
        let out = resample_mono(&[0.5], 48_000, 8_000).unwrap();
        assert_eq!(out.len(), 1);
    }
}
