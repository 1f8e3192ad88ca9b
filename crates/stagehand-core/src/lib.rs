//! Stagehand Core - a staged, concurrent image pipeline.
//!
//! Each image in a batch moves through four fixed stages:
//!
//! ```text
//! Load → Resize → Grayscale → Save → outcome
//! ```
//!
//! In [`ExecutionMode::Concurrent`] every stage is its own worker and jobs
//! are handed between them over queues, so several images are in flight at
//! once. In [`ExecutionMode::Sequential`] one thread runs each image through
//! every stage before starting the next. Both modes yield exactly one
//! [`JobOutcome`] per submitted source, and the same outcomes for the same
//! batch.
//!
//! Failures are data: a job that fails at one stage is forwarded untouched
//! by the rest and surfaces as [`Outcome::Failure`], without affecting any
//! other job.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stagehand_core::{Config, ExecutionMode, ImageTransforms, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> stagehand_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::new(ImageTransforms::from_config(&config), &config);
//!
//!     let batch = vec!["images/image1.jpeg".into(), "images/image2.jpeg".into()];
//!     let report = pipeline.run(batch, ExecutionMode::Concurrent).await?;
//!     println!("{} ok, {} failed in {:?}", report.succeeded(), report.failed(), report.elapsed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{BoxError, ConfigError, PipelineError, PipelineResult, Result, StagehandError};
pub use output::{ReportFormat, ReportWriter};
pub use pipeline::{FileDiscovery, ImageTransforms, OutputNaming, Pipeline, StageKind, Transforms};
pub use types::{BatchReport, ExecutionMode, JobOutcome, Outcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a batch of image paths with the image collaborators built from `config`.
pub async fn run_pipeline(
    config: &Config,
    batch: Vec<std::path::PathBuf>,
    mode: ExecutionMode,
) -> Result<BatchReport> {
    Pipeline::new(ImageTransforms::from_config(config), config)
        .run(batch, mode)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_run_pipeline_missing_sources() {
        let config = Config::default();
        let batch = vec![
            std::path::PathBuf::from("/nonexistent/images/a.png"),
            std::path::PathBuf::from("/nonexistent/images/b.png"),
        ];
        let report = run_pipeline(&config, batch, ExecutionMode::Concurrent)
            .await
            .unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.failed(), 2);
    }
}
