//! The staged processing pipeline.
//!
//! - **job**: the unit of work carried between stages
//! - **transform**: the collaborator trait the stages drive
//! - **imaging**: image-backed collaborators
//! - **stage**: per-item step semantics (skip failed, guard panics, cancel)
//! - **channel**: handoff queues and the stage worker loop
//! - **runner**: wires the stages and runs both executor modes
//! - **naming**: destination paths
//! - **discovery**: expands inputs into a batch

pub mod channel;
pub mod discovery;
pub mod imaging;
pub mod job;
pub mod naming;
pub mod runner;
pub mod stage;
pub mod transform;

// Re-exports for convenient access
pub use channel::{handoff, HandoffReceiver, HandoffSender, PipelineStage};
pub use discovery::FileDiscovery;
pub use imaging::ImageTransforms;
pub use job::Job;
pub use naming::OutputNaming;
pub use runner::Pipeline;
pub use stage::{StageContext, StageKind};
pub use transform::Transforms;
