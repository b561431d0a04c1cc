use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Score how similar short song clips sound
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// JSON pipeline configuration; flags below override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Spectral descriptor to compare
    #[arg(long, value_enum, global = true)]
    pub variant: Option<Variant>,

    /// Number of mel bands
    #[arg(long, global = true)]
    pub bands: Option<usize>,

    /// Number of cepstral coefficients (cepstral variant only)
    #[arg(long, global = true)]
    pub coefficients: Option<usize>,

    /// Weight of spectral similarity relative to tempo proximity
    #[arg(long, global = true)]
    pub weight: Option<f64>,

    /// Analysis sampling rate in Hz
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Fail on clips not already at the analysis rate instead of resampling
    #[arg(long, global = true)]
    pub reject_rate_mismatch: bool,

    /// Decode at most this many seconds of each clip
    #[arg(long, global = true)]
    pub max_duration: Option<f64>,

    /// Directory for temporary staging files
    #[arg(long, global = true)]
    pub scratch_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the similarity score of two clips
    Compare { a: PathBuf, b: PathBuf },

    /// Rank candidate clips against an answer clip, printed as JSON
    Rank {
        answer: PathBuf,

        #[arg(required = true)]
        candidates: Vec<PathBuf>,

        /// Candidates analysed at the same time
        #[arg(long)]
        concurrency: Option<usize>,

        /// Give up on a candidate after this many seconds
        #[arg(long)]
        timeout: Option<f64>,
    },

    /// Print the fingerprint of one clip as JSON
    Fingerprint { clip: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Mean and variance of each mel band
    Mel,
    /// Cepstral coefficients
    Cepstral,
}
