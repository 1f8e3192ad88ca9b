//! Per-item stage steps shared by both executor modes.
//!
//! A step never raises: collaborator errors and panics become a failure
//! recorded on the job, and a job that already failed passes through
//! untouched. The concurrent executor runs these steps inside stage workers,
//! the sequential executor calls them back to back.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, PipelineError, PipelineResult};
use crate::types::JobOutcome;

use super::job::Job;
use super::naming::OutputNaming;
use super::transform::Transforms;

/// The four fixed positions in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Load,
    Resize,
    Grayscale,
    Save,
}

impl StageKind {
    /// All stages in pipeline order.
    pub const ALL: [StageKind; 4] = [
        StageKind::Load,
        StageKind::Resize,
        StageKind::Grayscale,
        StageKind::Save,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Load => "load",
            StageKind::Resize => "resize",
            StageKind::Grayscale => "grayscale",
            StageKind::Save => "save",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature of the two middle transforms on [`Transforms`].
pub type TransformFn<T> =
    fn(&T, <T as Transforms>::Payload) -> Result<<T as Transforms>::Payload, BoxError>;

/// Everything a step needs. Cheap to clone into each worker.
pub struct StageContext<T: Transforms> {
    transforms: Arc<T>,
    naming: OutputNaming,
    cancel: CancellationToken,
}

impl<T: Transforms> Clone for StageContext<T> {
    fn clone(&self) -> Self {
        Self {
            transforms: Arc::clone(&self.transforms),
            naming: self.naming.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<T: Transforms> StageContext<T> {
    pub fn new(transforms: Arc<T>, naming: OutputNaming, cancel: CancellationToken) -> Self {
        Self {
            transforms,
            naming,
            cancel,
        }
    }

    /// Load stage: create the job for a source and fill its payload.
    pub fn load(&self, source: PathBuf) -> Job<T::Payload> {
        let dest = self.naming.output_path(&source);
        let mut job = Job::new(source, dest);

        if self.cancel.is_cancelled() {
            job.fail(cancelled(StageKind::Load, job.source()));
            return job;
        }

        let result = guarded(StageKind::Load, job.source(), || {
            self.transforms
                .load(job.source())
                .map_err(|e| PipelineError::Load {
                    path: job.source().to_path_buf(),
                    message: e.to_string(),
                })
        });

        match result {
            Ok(payload) => job.set_payload(payload),
            Err(e) => {
                tracing::warn!("Error loading {}: {}", job.source().display(), e);
                job.fail(e);
            }
        }
        job
    }

    /// Transform stage: apply `transform` unless the job already failed.
    pub fn apply(
        &self,
        stage: StageKind,
        mut job: Job<T::Payload>,
        transform: TransformFn<T>,
    ) -> Job<T::Payload> {
        if job.is_failed() {
            return job;
        }
        if self.cancel.is_cancelled() {
            job.fail(cancelled(stage, job.source()));
            return job;
        }
        let Some(payload) = job.take_payload() else {
            job.fail(missing_payload(stage, job.source()));
            return job;
        };

        let transforms: &T = &self.transforms;
        let result = guarded(stage, job.source(), || {
            transform(transforms, payload).map_err(|e| PipelineError::Transform {
                stage,
                path: job.source().to_path_buf(),
                message: e.to_string(),
            })
        });

        match result {
            Ok(payload) => job.set_payload(payload),
            Err(e) => {
                tracing::warn!("{} failed for {}: {}", stage, job.source().display(), e);
                job.fail(e);
            }
        }
        job
    }

    /// Save stage: write the payload and turn the job into its outcome.
    pub fn save(&self, mut job: Job<T::Payload>) -> JobOutcome {
        if job.is_failed() {
            return job.into_outcome();
        }
        if self.cancel.is_cancelled() {
            job.fail(cancelled(StageKind::Save, job.source()));
            return job.into_outcome();
        }
        let Some(payload) = job.take_payload() else {
            job.fail(missing_payload(StageKind::Save, job.source()));
            return job.into_outcome();
        };

        let result = guarded(StageKind::Save, job.source(), || {
            self.transforms
                .save(job.dest(), payload)
                .map_err(|e| PipelineError::Save {
                    path: job.dest().to_path_buf(),
                    message: e.to_string(),
                })
        });

        if let Err(e) = result {
            tracing::warn!("Error saving {}: {}", job.dest().display(), e);
            job.fail(e);
        }
        job.into_outcome()
    }

    /// Run all four steps for one source.
    pub fn process(&self, source: PathBuf) -> JobOutcome {
        let job = self.load(source);
        let job = self.apply(StageKind::Resize, job, T::resize);
        let job = self.apply(StageKind::Grayscale, job, T::grayscale);
        self.save(job)
    }
}

/// Run `f`, converting a panic into a transform failure for this job.
fn guarded<R>(
    stage: StageKind,
    source: &Path,
    f: impl FnOnce() -> PipelineResult<R>,
) -> PipelineResult<R> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        tracing::error!("{} panicked on {}", stage, source.display());
        Err(PipelineError::Transform {
            stage,
            path: source.to_path_buf(),
            message: format!("panicked: {}", panic_message(panic.as_ref())),
        })
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn cancelled(stage: StageKind, source: &Path) -> PipelineError {
    PipelineError::Cancelled {
        stage,
        path: source.to_path_buf(),
    }
}

fn missing_payload(stage: StageKind, source: &Path) -> PipelineError {
    PipelineError::Transform {
        stage,
        path: source.to_path_buf(),
        message: "job reached stage without a payload".to_string(),
    }
}
