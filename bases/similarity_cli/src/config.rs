use crate::args::{Args, Variant};
use audio_fingerprint::{SpectralVariant, TimeReduction, DEFAULT_CEPSTRAL_COEFFICIENTS};
use similarity_pipeline::{PipelineConfig, PipelineError};
use waveform_loader::{SampleRatePolicy, ANALYSIS_SAMPLE_RATE};

/// Build the pipeline configuration: JSON file (if any), then flags
pub fn from_args(args: &Args) -> Result<PipelineConfig, PipelineError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, args: &Args) {
    let fingerprint = &mut config.fingerprint;

    if let Some(bands) = args.bands {
        fingerprint.mel_bands = bands;
    }

    match args.variant {
        Some(Variant::Mel) => {
            if !matches!(fingerprint.spectral, SpectralVariant::MelStatistics { .. }) {
                fingerprint.spectral = SpectralVariant::default();
            }
        }
        Some(Variant::Cepstral) => {
            if !matches!(fingerprint.spectral, SpectralVariant::Cepstral { .. }) {
                fingerprint.spectral = SpectralVariant::Cepstral {
                    coefficients: DEFAULT_CEPSTRAL_COEFFICIENTS,
                    reduction: TimeReduction::default(),
                };
            }
        }
        None => {}
    }

    if let (Some(n), SpectralVariant::Cepstral { coefficients, .. }) =
        (args.coefficients, &mut fingerprint.spectral)
    {
        *coefficients = n;
    }

    if let Some(weight) = args.weight {
        fingerprint.similarity.spectral_weight = weight;
    }

    let rate = args.sample_rate.unwrap_or(match config.sample_rate {
        SampleRatePolicy::Resample { target_hz } => target_hz,
        SampleRatePolicy::Reject { expected_hz } => expected_hz,
        SampleRatePolicy::Native => ANALYSIS_SAMPLE_RATE,
    });
    if args.reject_rate_mismatch {
        config.sample_rate = SampleRatePolicy::Reject { expected_hz: rate };
    } else if args.sample_rate.is_some() {
        config.sample_rate = SampleRatePolicy::Resample { target_hz: rate };
    }

    if let Some(secs) = args.max_duration {
        config.max_duration_secs = Some(secs);
    }
    if let Some(dir) = &args.scratch_dir {
        config.scratch_root = Some(dir.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::Parser;
    use std::io::Write;

    fn parse(flags: &[&str]) -> Args {
        let mut argv = vec!["song-similarity"];
        argv.extend_from_slice(flags);
        argv.extend_from_slice(&["compare", "a.mp3", "b.mp3"]);
        Args::parse_from(argv)
    }

    #[test]
    fn no_flags_is_the_default_config() {
        assert_eq!(from_args(&parse(&[])).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn cepstral_variant_with_coefficients() {
        let config = from_args(&parse(&["--variant", "cepstral", "--coefficients", "20"])).unwrap();
        assert_eq!(
            config.fingerprint.spectral,
            SpectralVariant::Cepstral {
                coefficients: 20,
                reduction: TimeReduction::MeanVariance
            }
        );
    }

    #[test]
    fn coefficients_are_ignored_for_mel_statistics() {
        let config = from_args(&parse(&["--coefficients", "20"])).unwrap();
        assert_eq!(config.fingerprint.spectral, SpectralVariant::default());
    }

    #[test]
    fn weight_and_bands_override() {
        let config = from_args(&parse(&["--weight", "5", "--bands", "64"])).unwrap();
        assert_eq!(config.fingerprint.similarity.spectral_weight, 5.0);
        assert_eq!(config.fingerprint.mel_bands, 64);
    }

    #[test]
    fn reject_uses_the_requested_rate() {
        let config = from_args(&parse(&["--sample-rate", "44100", "--reject-rate-mismatch"])).unwrap();
        assert_eq!(config.sample_rate, SampleRatePolicy::Reject { expected_hz: 44_100 });

        let config = from_args(&parse(&["--sample-rate", "16000"])).unwrap();
        assert_eq!(config.sample_rate, SampleRatePolicy::Resample { target_hz: 16_000 });
    }

    #[test]
    fn flags_override_the_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "fingerprint": {{ "mel_bands": 40, "similarity": {{ "spectral_weight": 2.0 }} }} }}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = from_args(&parse(&["--config", path, "--weight", "7"])).unwrap();
        assert_eq!(config.fingerprint.mel_bands, 40);
        assert_eq!(config.fingerprint.similarity.spectral_weight, 7.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_matches!(
            from_args(&parse(&["--weight=-1"])),
            Err(PipelineError::Config(_))
        );
    }
}
