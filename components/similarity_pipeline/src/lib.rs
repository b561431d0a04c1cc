//! Orchestrates clip staging, decoding, fingerprinting and scoring.
//!
//! ```no_run
//! # use similarity_pipeline::{LocalFile, PipelineConfig, PipelineError, SimilarityPipeline};
//! let pipeline = SimilarityPipeline::new(PipelineConfig::default())?;
//! let score = pipeline.compare(&LocalFile::new("answer.mp3"), &LocalFile::new("guess.mp3"))?;
//! println!("{}", score);
//! # Ok::<(), PipelineError>(())
//! ```

mod config;
mod error;
mod pipeline;
pub mod ranking;
mod scratch;
mod source;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::SimilarityPipeline;
pub use ranking::{rank_candidates, Ranking, RankingOptions};
pub use scratch::ScratchSpace;
pub use source::{AudioSource, InMemoryClip, LocalFile, Retrieved, Retriever};
