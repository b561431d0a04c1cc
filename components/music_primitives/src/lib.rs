mod score;
mod tempo;

pub use score::{ScoreError, SimilarityScore};
pub use tempo::{Tempo, TempoError};
