use assert_matches::assert_matches;
use audio_fingerprint::{
    FingerprintConfig, FingerprintError, Fingerprinter, FrameConfig, Operand, SpectralVariant, TempoConfig,
    TempoEstimator, TimeReduction,
};
use music_primitives::Tempo;
use rstest::rstest;
use std::f32::consts::PI;
use waveform_loader::{DecodeError, Waveform};

const RATE: u32 = 22_050;

/// Decaying 1 kHz blips on every beat
fn click_track(bpm: f64, seconds: f64) -> Waveform {
    let len = (seconds * RATE as f64) as usize;
    let period = 60.0 / bpm * RATE as f64;
    let blip = (0.03 * RATE as f64) as usize;
    let mut samples = vec![0.0f32; len];

    let mut beat = 0.0f64;
    while (beat as usize) < len {
        let start = beat as usize;
        for i in 0..blip.min(len - start) {
            let t = i as f32 / RATE as f32;
            samples[start + i] = (2.0 * PI * 1000.0 * t).sin() * (-t * 120.0).exp();
        }
        beat += period;
    }

    Waveform::new(samples, RATE).unwrap()
}

/// A chord with a slow tremolo so the spectrum has some variance over time
fn chord(seconds: f64) -> Waveform {
    let len = (seconds * RATE as f64) as usize;
    let samples = (0..len)
        .map(|i| {
            let t = i as f32 / RATE as f32;
            let tremolo = 0.75 + 0.25 * (2.0 * PI * 3.0 * t).sin();
            tremolo
                * [261.6f32, 329.6, 392.0]
                    .iter()
                    .map(|f| 0.2 * (2.0 * PI * f * t).sin())
                    .sum::<f32>()
        })
        .collect();
    Waveform::new(samples, RATE).unwrap()
}

fn cepstral(reduction: TimeReduction) -> Fingerprinter {
    Fingerprinter::new(FingerprintConfig {
        spectral: SpectralVariant::Cepstral {
            coefficients: 13,
            reduction,
        },
        ..Default::default()
    })
    .unwrap()
}

#[rstest]
#[case(100.0)]
#[case(120.0)]
fn click_track_tempo_is_recovered(#[case] bpm: f64) {
    let estimator = TempoEstimator::new(&FrameConfig::default(), 128, TempoConfig::default());
    let tempo = estimator.estimate(&click_track(bpm, 20.0)).unwrap();
    assert!(
        (tempo.bpm() - bpm).abs() < 5.0,
        "expected about {} BPM, got {}",
        bpm,
        tempo
    );
}

#[test]
fn tempo_is_deterministic_and_non_negative() {
    let estimator = TempoEstimator::new(&FrameConfig::default(), 128, TempoConfig::default());
    let clip = chord(5.0);
    let first = estimator.estimate(&clip).unwrap();
    let second = estimator.estimate(&clip).unwrap();
    assert_eq!(first, second);
    assert!(first.bpm() >= 0.0);
}

#[test]
fn zero_samples_are_a_decode_error() {
    assert_matches!(Waveform::new(Vec::new(), RATE), Err(DecodeError::Empty));

    let estimator = TempoEstimator::new(&FrameConfig::default(), 128, TempoConfig::default());
    assert_matches!(
        estimator.estimate_samples(&[], RATE),
        Err(FingerprintError::Decode(DecodeError::Empty))
    );
}

#[test]
fn mel_statistics_length_is_independent_of_duration() {
    let fingerprinter = Fingerprinter::new(FingerprintConfig::default()).unwrap();
    let short = fingerprinter.fingerprint(&chord(1.0)).unwrap();
    let long = fingerprinter.fingerprint(&chord(7.0)).unwrap();
    assert_eq!(short.spectral().len(), long.spectral().len());
    assert_eq!(short.spectral().len(), 256);
}

#[rstest]
#[case(FingerprintConfig::default())]
#[case(FingerprintConfig {
    spectral: SpectralVariant::Cepstral { coefficients: 13, reduction: TimeReduction::MeanVariance },
    ..Default::default()
})]
fn identical_clips_score_above_threshold(#[case] config: FingerprintConfig) {
    let fingerprinter = Fingerprinter::new(config).unwrap();
    let clip = click_track(120.0, 30.0);
    let a = fingerprinter.fingerprint(&clip).unwrap();
    let b = fingerprinter.fingerprint(&clip.clone()).unwrap();

    let score = fingerprinter.compare(&a, &b).unwrap();
    assert!(score.value() > 0.98, "score {}", score);
    assert!((score.value() - 1.0).abs() < 1e-9);
}

#[test]
fn comparison_is_symmetric() {
    let fingerprinter = Fingerprinter::new(FingerprintConfig::default()).unwrap();
    let a = fingerprinter.fingerprint(&click_track(100.0, 6.0)).unwrap();
    let b = fingerprinter.fingerprint(&chord(6.0)).unwrap();

    assert_eq!(
        fingerprinter.compare(&a, &b).unwrap(),
        fingerprinter.compare(&b, &a).unwrap()
    );
}

#[test]
fn different_songs_score_lower_than_identical_ones() {
    let fingerprinter = Fingerprinter::new(FingerprintConfig::default()).unwrap();
    let clicks = fingerprinter.fingerprint(&click_track(100.0, 6.0)).unwrap();
    let music = fingerprinter.fingerprint(&chord(6.0)).unwrap();

    let different = fingerprinter.compare(&clicks, &music).unwrap();
    let same = fingerprinter.compare(&music, &music).unwrap();
    assert!(different.value() < same.value());
}

#[rstest]
#[case(FingerprintConfig::default())]
#[case(FingerprintConfig {
    spectral: SpectralVariant::Cepstral { coefficients: 13, reduction: TimeReduction::MeanVariance },
    ..Default::default()
})]
#[case(FingerprintConfig {
    spectral: SpectralVariant::Cepstral { coefficients: 13, reduction: TimeReduction::Mean },
    ..Default::default()
})]
fn clip_against_silence_is_degenerate(#[case] config: FingerprintConfig) {
    let fingerprinter = Fingerprinter::new(config).unwrap();
    let clip = fingerprinter.fingerprint(&chord(3.0)).unwrap();
    let silence = fingerprinter
        .fingerprint(&Waveform::new(vec![0.0; 3 * RATE as usize], RATE).unwrap())
        .unwrap();

    assert_eq!(silence.tempo(), Tempo::ZERO);
    assert_matches!(
        fingerprinter.compare(&clip, &silence),
        Err(FingerprintError::DegenerateVector(Operand::Right))
    );
}

#[test]
fn mean_and_mean_variance_descriptors_do_not_compare() {
    let clip = chord(2.0);
    let with_variance = cepstral(TimeReduction::MeanVariance).fingerprint(&clip).unwrap();
    let mean_only = cepstral(TimeReduction::Mean).fingerprint(&clip).unwrap();

    assert_eq!(with_variance.spectral().len(), 26);
    assert_eq!(mean_only.spectral().len(), 13);
    assert_matches!(
        cepstral(TimeReduction::Mean).compare(&with_variance, &mean_only),
        Err(FingerprintError::ShapeMismatch {
            left_len: 26,
            right_len: 13,
            ..
        })
    );
}
