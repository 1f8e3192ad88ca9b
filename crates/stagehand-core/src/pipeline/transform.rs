//! The collaborator seam: the four operations a pipeline drives.

use std::path::Path;

use crate::error::BoxError;

/// Load, transform and save operations applied by the pipeline stages.
///
/// Implementations must be stateless with respect to individual jobs; one
/// instance is shared by every stage worker.
pub trait Transforms: Send + Sync + 'static {
    /// The in-flight content of a job.
    type Payload: Send + 'static;

    /// Turn a source reference into a payload.
    fn load(&self, source: &Path) -> Result<Self::Payload, BoxError>;

    /// First transform (resize).
    fn resize(&self, payload: Self::Payload) -> Result<Self::Payload, BoxError>;

    /// Second transform (grayscale).
    fn grayscale(&self, payload: Self::Payload) -> Result<Self::Payload, BoxError>;

    /// Write the processed payload to its destination.
    fn save(&self, dest: &Path, payload: Self::Payload) -> Result<(), BoxError>;
}
