//! Error types for the Stagehand pipeline.
//!
//! Two layers exist. [`PipelineError`] is per-job data: it is recorded on a
//! [`Job`](crate::pipeline::Job) and carried to the result sink, never raised
//! across a stage boundary. [`StagehandError`] is for failures of the run
//! itself (bad configuration, a crashed stage worker, I/O at the edges).

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::StageKind;

/// Top-level error type for Stagehand operations.
#[derive(Error, Debug)]
pub enum StagehandError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage worker terminated abnormally
    #[error("Stage worker failed: {0}")]
    Worker(String),

    /// The result sink saw a different number of outcomes than jobs submitted
    #[error("Incomplete batch: expected {expected} outcomes, received {received}")]
    IncompleteBatch { expected: usize, received: usize },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-job failure, organized by the stage that first observed it.
///
/// Once set on a job it is never cleared; later stages forward the job
/// untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineError {
    /// The source could not be turned into a payload
    #[error("Load error for {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// A transform failed or panicked
    #[error("{stage} failed for {path}: {message}")]
    Transform {
        stage: StageKind,
        path: PathBuf,
        message: String,
    },

    /// The processed payload could not be written
    #[error("Save error for {path}: {message}")]
    Save { path: PathBuf, message: String },

    /// The run was cancelled before this job reached the stage
    #[error("Cancelled before {stage} for {path}")]
    Cancelled { stage: StageKind, path: PathBuf },
}

impl PipelineError {
    /// The stage at which the failure was recorded.
    pub fn stage(&self) -> StageKind {
        match self {
            Self::Load { .. } => StageKind::Load,
            Self::Transform { stage, .. } | Self::Cancelled { stage, .. } => *stage,
            Self::Save { .. } => StageKind::Save,
        }
    }
}

/// Error type returned by the transform collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience type alias for Stagehand results.
pub type Result<T> = std::result::Result<T, StagehandError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
