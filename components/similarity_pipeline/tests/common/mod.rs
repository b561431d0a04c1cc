use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const RATE: u32 = 22_050;

pub fn write_wav(dir: &Path, name: &str, samples: &[f32]) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    for &sample in samples {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
    path
}

/// A pulsing two-note pattern at `bpm`, pitched around `root_hz`
pub fn song(bpm: f32, root_hz: f32, seconds: f32) -> Vec<f32> {
    let beat = 60.0 / bpm;
    (0..(RATE as f32 * seconds) as usize)
        .map(|i| {
            let t = i as f32 / RATE as f32;
            let since_beat = t % beat;
            let envelope = (-since_beat * 8.0).exp();
            let note = if (t / beat) as usize % 2 == 0 { root_hz } else { root_hz * 1.5 };
            0.5 * envelope * (2.0 * PI * note * t).sin()
        })
        .collect()
}

pub fn silence(seconds: f32) -> Vec<f32> {
    vec![0.0; (RATE as f32 * seconds) as usize]
}

pub fn is_empty(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path()).expect("read scratch root").next().is_none()
}
