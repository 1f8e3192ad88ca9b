//! The unit of work moving through the pipeline.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::types::{JobOutcome, Outcome};

/// One item in flight: identity, destination, payload, and first failure.
///
/// A job is owned by exactly one stage at a time; handing it to the next
/// queue moves it.
#[derive(Debug)]
pub struct Job<P> {
    source: PathBuf,
    dest: PathBuf,
    payload: Option<P>,
    failure: Option<PipelineError>,
}

impl<P> Job<P> {
    /// Create a job with no payload yet.
    pub fn new(source: PathBuf, dest: PathBuf) -> Self {
        Self {
            source,
            dest,
            payload: None,
            failure: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn failure(&self) -> Option<&PipelineError> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Store a fresh payload. Ignored on a failed job.
    pub(crate) fn set_payload(&mut self, payload: P) {
        if self.failure.is_none() {
            self.payload = Some(payload);
        }
    }

    /// Take the payload out for a transform.
    pub(crate) fn take_payload(&mut self) -> Option<P> {
        self.payload.take()
    }

    /// Record a failure. The first one wins; the payload is released.
    pub(crate) fn fail(&mut self, error: PipelineError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
        self.payload = None;
    }

    /// Consume the job at the result sink.
    pub fn into_outcome(self) -> JobOutcome {
        let outcome = match self.failure {
            Some(e) => Outcome::Failure(e),
            None => Outcome::Success,
        };
        JobOutcome {
            source: self.source,
            dest: self.dest,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageKind;

    fn job() -> Job<u32> {
        Job::new(PathBuf::from("images/a.png"), PathBuf::from("images/output/a.png"))
    }

    #[test]
    fn test_first_failure_wins() {
        let mut job = job();
        job.set_payload(7);
        job.fail(PipelineError::Load {
            path: job.source().to_path_buf(),
            message: "first".into(),
        });
        job.fail(PipelineError::Transform {
            stage: StageKind::Resize,
            path: job.source().to_path_buf(),
            message: "second".into(),
        });

        assert!(job.payload().is_none());
        assert_eq!(job.failure().unwrap().stage(), StageKind::Load);
    }

    #[test]
    fn test_failed_job_rejects_payload() {
        let mut job = job();
        job.fail(PipelineError::Save {
            path: job.dest().to_path_buf(),
            message: "nope".into(),
        });
        job.set_payload(3);
        assert!(job.payload().is_none());
    }

    #[test]
    fn test_into_outcome() {
        let mut ok = job();
        ok.set_payload(1);
        let outcome = ok.into_outcome();
        assert!(outcome.outcome.is_success());
        assert_eq!(outcome.dest, PathBuf::from("images/output/a.png"));

        let mut bad = job();
        bad.fail(PipelineError::Cancelled {
            stage: StageKind::Save,
            path: PathBuf::from("images/a.png"),
        });
        assert!(!bad.into_outcome().outcome.is_success());
    }
}
