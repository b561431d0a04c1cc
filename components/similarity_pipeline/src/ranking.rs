//! Concurrent scoring of many candidates against one answer clip.

use crate::error::PipelineError;
use crate::pipeline::SimilarityPipeline;
use crate::source::AudioSource;
use audio_fingerprint::SongFingerprint;
use chrono::{DateTime, Utc};
use music_primitives::{SimilarityScore, Tempo};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RankingOptions {
    /// Candidates analysed at the same time
    pub max_concurrency: usize,
    /// Per-candidate limit, measured from when its analysis starts
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate: String,
    pub score: SimilarityScore,
    pub tempo: Tempo,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedCandidate {
    pub candidate: String,
    pub error: String,
}

/// Candidates ordered best-first. Candidates that could not be scored are
/// listed under `failures` and never receive a score.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub answer: String,
    pub answer_tempo: Tempo,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<RankedCandidate>,
    pub failures: Vec<FailedCandidate>,
}

impl Ranking {
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.entries.first()
    }
}

pub async fn rank_candidates(
    pipeline: Arc<SimilarityPipeline>,
    answer: Arc<dyn AudioSource>,
    candidates: Vec<Arc<dyn AudioSource>>,
    options: RankingOptions,
) -> Result<Ranking, PipelineError> {
    let answer_label = answer.describe();
    tracing::info!(
        "Ranking {} candidates against {}",
        candidates.len(),
        answer_label
    );

    let answer_fingerprint = {
        let pipeline = pipeline.clone();
        let work = tokio::task::spawn_blocking(move || pipeline.fingerprint(answer.as_ref()));
        tokio::select! {
            biased;
            _ = options.cancel.cancelled() => return Err(PipelineError::Cancelled),
            joined = work => joined.map_err(|e| PipelineError::Task(e.to_string()))??,
        }
    };
    let answer_fingerprint = Arc::new(answer_fingerprint);

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        let pipeline = pipeline.clone();
        let answer = answer_fingerprint.clone();
        let semaphore = semaphore.clone();
        let options = options.clone();
        tasks.spawn(async move {
            let label = candidate.describe();
            let result = score_candidate(pipeline, answer, candidate, semaphore, options).await;
            (index, label, result)
        });
    }

    let mut scored = Vec::new();
    let mut failed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, candidate, result) = joined.map_err(|e| PipelineError::Task(e.to_string()))?;
        match result {
            Ok((score, tempo)) => {
                tracing::debug!("{} scored {}", candidate, score);
                scored.push((
                    index,
                    RankedCandidate {
                        candidate,
                        score,
                        tempo,
                    },
                ));
            }
            Err(e) => {
                tracing::warn!("Could not score {}: {}", candidate, e);
                failed.push((
                    index,
                    FailedCandidate {
                        candidate,
                        error: e.to_string(),
                    },
                ));
            }
        }
    }

    scored.sort_by(|(ia, a), (ib, b)| a.score.cmp_descending(&b.score).then(ia.cmp(ib)));
    failed.sort_by_key(|(index, _)| *index);

    Ok(Ranking {
        answer: answer_label,
        answer_tempo: answer_fingerprint.tempo(),
        generated_at: Utc::now(),
        entries: scored.into_iter().map(|(_, entry)| entry).collect(),
        failures: failed.into_iter().map(|(_, failure)| failure).collect(),
    })
}

async fn score_candidate(
    pipeline: Arc<SimilarityPipeline>,
    answer: Arc<SongFingerprint>,
    candidate: Arc<dyn AudioSource>,
    semaphore: Arc<Semaphore>,
    options: RankingOptions,
) -> Result<(SimilarityScore, Tempo), PipelineError> {
    let permit = tokio::select! {
        biased;
        _ = options.cancel.cancelled() => return Err(PipelineError::Cancelled),
        permit = semaphore.acquire_owned() => permit.map_err(|e| PipelineError::Task(e.to_string()))?,
    };

    // The permit travels with the blocking work, so abandoned work still
    // counts against the concurrency limit until it finishes.
    let cancel = options.cancel.clone();
    let work = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let fingerprint = pipeline.fingerprint(candidate.as_ref())?;
        let score = pipeline.score(&answer, &fingerprint)?;
        Ok((score, fingerprint.tempo()))
    });

    let joined = match options.timeout {
        Some(limit) => tokio::select! {
            biased;
            _ = options.cancel.cancelled() => return Err(PipelineError::Cancelled),
            result = tokio::time::timeout(limit, work) => result.map_err(|_| PipelineError::TimedOut(limit))?,
        },
        None => tokio::select! {
            biased;
            _ = options.cancel.cancelled() => return Err(PipelineError::Cancelled),
            result = work => result,
        },
    };

    joined.map_err(|e| PipelineError::Task(e.to_string()))?
}
