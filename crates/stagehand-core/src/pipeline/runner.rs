//! Pipeline orchestration: wires the four stages and drives a batch through them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, PipelineConfig};
use crate::error::{Result, StagehandError};
use crate::types::{BatchReport, ExecutionMode, JobOutcome};

use super::channel::{handoff, stage_channel, HandoffReceiver, PipelineStage};
use super::naming::OutputNaming;
use super::stage::{StageContext, StageKind};
use super::transform::Transforms;

/// A load → resize → grayscale → save pipeline over a set of collaborators.
///
/// Queues, workers and the cancellation scope are created per run, so one
/// `Pipeline` can drive several batches, even at the same time, and
/// cancelling one run never touches another.
pub struct Pipeline<T: Transforms> {
    transforms: Arc<T>,
    naming: OutputNaming,
    config: PipelineConfig,
}

impl<T: Transforms> Pipeline<T> {
    /// Create a pipeline with the given collaborators and configuration.
    pub fn new(transforms: T, config: &Config) -> Self {
        Self {
            transforms: Arc::new(transforms),
            naming: OutputNaming::new(&config.output),
            config: config.pipeline.clone(),
        }
    }

    /// Mode from `pipeline.mode`, used when the caller does not pick one.
    pub fn default_mode(&self) -> ExecutionMode {
        self.config.mode
    }

    /// Drive a batch through every stage and wait for one outcome per source.
    pub async fn run(&self, batch: Vec<PathBuf>, mode: ExecutionMode) -> Result<BatchReport> {
        self.run_with_cancel(batch, mode, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), stopping early when `cancel` fires.
    ///
    /// Cancelling does not drop jobs: each remaining job finishes with a
    /// `Cancelled` failure. The token only scopes this run; pass a
    /// `child_token()` to tie several runs to one shutdown signal.
    pub async fn run_with_cancel(
        &self,
        batch: Vec<PathBuf>,
        mode: ExecutionMode,
        cancel: CancellationToken,
    ) -> Result<BatchReport> {
        let expected = batch.len();
        tracing::info!("Running {} job(s) in {} mode", expected, mode);

        let ctx = StageContext::new(Arc::clone(&self.transforms), self.naming.clone(), cancel);
        let start = Instant::now();
        let outcomes = match mode {
            ExecutionMode::Concurrent => self.run_concurrent(ctx, batch).await?,
            ExecutionMode::Sequential => run_sequential(ctx, batch).await?,
        };
        let elapsed = start.elapsed();

        if outcomes.len() != expected {
            return Err(StagehandError::IncompleteBatch {
                expected,
                received: outcomes.len(),
            });
        }

        let report = BatchReport {
            mode,
            outcomes,
            elapsed,
        };
        tracing::info!(
            "{} mode: {} succeeded, {} failed in {:?}",
            mode,
            report.succeeded(),
            report.failed(),
            report.elapsed
        );
        Ok(report)
    }

    /// Synchronous entry point: builds a runtime and blocks until the batch is done.
    ///
    /// Must not be called from within an async context.
    pub fn run_blocking(&self, batch: Vec<PathBuf>, mode: ExecutionMode) -> Result<BatchReport> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.run(batch, mode))
    }

    /// One worker per stage, connected by handoff queues.
    async fn run_concurrent(
        &self,
        context: StageContext<T>,
        batch: Vec<PathBuf>,
    ) -> Result<Vec<JobOutcome>> {
        // The batch is already in memory: seed an unbounded queue and close it
        let (seed_tx, seed_rx) = handoff::<PathBuf>(None);
        for source in batch {
            if seed_tx.send(source).await.is_err() {
                return Err(StagehandError::Worker("seed queue closed".into()));
            }
        }
        drop(seed_tx);

        let (loaded_tx, loaded_rx) = stage_channel(&self.config);
        let (resized_tx, resized_rx) = stage_channel(&self.config);
        let (gray_tx, gray_rx) = stage_channel(&self.config);
        let (out_tx, out_rx) = stage_channel(&self.config);

        let ctx = context.clone();
        let load = tokio::spawn(
            PipelineStage::new(StageKind::Load.as_str(), seed_rx, loaded_tx)
                .run(move |source| ctx.load(source)),
        );

        let ctx = context.clone();
        let resize = tokio::spawn(
            PipelineStage::new(StageKind::Resize.as_str(), loaded_rx, resized_tx)
                .run(move |job| ctx.apply(StageKind::Resize, job, T::resize)),
        );

        let ctx = context.clone();
        let gray = tokio::spawn(
            PipelineStage::new(StageKind::Grayscale.as_str(), resized_rx, gray_tx)
                .run(move |job| ctx.apply(StageKind::Grayscale, job, T::grayscale)),
        );

        let ctx = context.clone();
        let save = tokio::spawn(
            PipelineStage::new(StageKind::Save.as_str(), gray_rx, out_tx)
                .run(move |job| ctx.save(job)),
        );

        let outcomes = collect(out_rx).await;

        for (kind, handle) in StageKind::ALL.into_iter().zip([load, resize, gray, save]) {
            join_stage(kind, handle).await?;
        }
        Ok(outcomes)
    }
}

/// One thread of control; each source runs through every stage before the next starts.
async fn run_sequential<T: Transforms>(
    ctx: StageContext<T>,
    batch: Vec<PathBuf>,
) -> Result<Vec<JobOutcome>> {
    tokio::task::spawn_blocking(move || {
        batch
            .into_iter()
            .map(|source| ctx.process(source))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| StagehandError::Worker(format!("sequential worker failed: {}", e)))
}

/// Result sink: read until end-of-sequence.
async fn collect(mut rx: HandoffReceiver<JobOutcome>) -> Vec<JobOutcome> {
    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        if outcome.outcome.is_success() {
            tracing::debug!("Saved {}", outcome.dest.display());
        }
        outcomes.push(outcome);
    }
    outcomes
}

async fn join_stage(
    kind: StageKind,
    handle: JoinHandle<std::result::Result<usize, String>>,
) -> Result<()> {
    match handle.await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(StagehandError::Worker(e)),
        Err(e) => Err(StagehandError::Worker(format!("{} stage crashed: {}", kind, e))),
    }
}
