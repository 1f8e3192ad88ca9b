//! Core data types returned by a pipeline run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PipelineError;

/// Scheduling strategy for a run.
///
/// Both modes produce the same multiset of outcomes for the same batch; they
/// differ only in wall-clock time and in how work overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One worker per stage, connected by handoff queues
    #[default]
    Concurrent,
    /// One thread of control, each item fully processed before the next
    Sequential,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Concurrent => write!(f, "concurrent"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Terminal result of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure(PipelineError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// The recorded failure, if any.
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(e) => Some(e),
        }
    }
}

/// One entry in a batch report: which source, where it was written, and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    /// Source reference as submitted
    pub source: PathBuf,

    /// Destination derived from the source
    pub dest: PathBuf,

    pub outcome: Outcome,
}

/// Result of driving one batch through the pipeline.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Mode the batch ran under
    pub mode: ExecutionMode,

    /// Exactly one outcome per submitted source, in arrival order at the sink
    pub outcomes: Vec<JobOutcome>,

    /// Time from submission of the first item to receipt of the last outcome
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of jobs that were saved successfully.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_success())
            .count()
    }

    /// Number of jobs that carry a failure.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate over the failures only.
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &PipelineError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.error().map(|e| (&o.source, e)))
    }

    /// Outcomes sorted by source, for comparing runs whose arrival order differs.
    pub fn sorted_outcomes(&self) -> Vec<JobOutcome> {
        let mut sorted = self.outcomes.clone();
        sorted.sort_by(|a, b| a.source.cmp(&b.source));
        sorted
    }

    /// Whether two reports hold the same multiset of (source, outcome) pairs.
    pub fn same_outcomes(&self, other: &BatchReport) -> bool {
        self.sorted_outcomes() == other.sorted_outcomes()
    }
}
