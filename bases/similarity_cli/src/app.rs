use crate::args::{Args, Command};
use crate::config;
use crate::output::OutputHandler;
use color_eyre::Result;
use similarity_pipeline::{rank_candidates, AudioSource, LocalFile, RankingOptions, SimilarityPipeline};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        let pipeline = Arc::new(SimilarityPipeline::new(config::from_args(&self.args)?)?);
        self.output.print_config(pipeline.config());

        match &self.args.command {
            Command::Compare { a, b } => {
                let (pa, pb) = (a.clone(), b.clone());
                let score = tokio::task::spawn_blocking(move || {
                    pipeline.compare(&LocalFile::new(&pa), &LocalFile::new(&pb))
                })
                .await??;
                self.output.print_score(a, b, score.value());
            }
            Command::Rank {
                answer,
                candidates,
                concurrency,
                timeout,
            } => {
                let mut options = RankingOptions::default();
                if let Some(n) = concurrency {
                    options.max_concurrency = *n;
                }
                options.timeout = timeout.map(Duration::from_secs_f64);

                let cancel = options.cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::warn!("Interrupted, cancelling remaining candidates");
                        cancel.cancel();
                    }
                });

                let ranking = rank_candidates(
                    pipeline,
                    local(answer),
                    candidates.iter().map(|path| local(path)).collect(),
                    options,
                )
                .await?;
                self.output.print_ranking(&ranking)?;
            }
            Command::Fingerprint { clip } => {
                let path = clip.clone();
                let fingerprint =
                    tokio::task::spawn_blocking(move || pipeline.fingerprint(&LocalFile::new(&path))).await??;
                self.output.print_fingerprint(&fingerprint)?;
            }
        }

        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

fn local(path: &Path) -> Arc<dyn AudioSource> {
    Arc::new(LocalFile::new(path))
}
