use audio_fingerprint::SongFingerprint;
use color_eyre::Result;
use similarity_pipeline::{PipelineConfig, Ranking};
use std::path::Path;

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_config(&self, config: &PipelineConfig) {
        if self.verbose {
            eprintln!("Representation: {}", config.fingerprint.representation());
            eprintln!("Spectral weight: {}", config.fingerprint.similarity.spectral_weight);
        }
    }

    pub fn print_score(&self, a: &Path, b: &Path, score: f64) {
        if self.verbose {
            println!("{} vs {}", a.display(), b.display());
        }
        println!("{:.5}", score);
    }

    pub fn print_ranking(&self, ranking: &Ranking) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(ranking)?);
        if self.verbose && !ranking.failures.is_empty() {
            eprintln!("{} candidate(s) could not be scored", ranking.failures.len());
        }
        Ok(())
    }

    pub fn print_fingerprint(&self, fingerprint: &SongFingerprint) -> Result<()> {
        if self.verbose {
            eprintln!("Tempo: {} BPM", fingerprint.tempo());
            eprintln!("Descriptor: {}", fingerprint.spectral().representation());
        }
        println!("{}", serde_json::to_string_pretty(fingerprint)?);
        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
