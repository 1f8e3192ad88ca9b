//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::types::ExecutionMode;

/// Pipeline execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Executor used when the caller does not pick one
    pub mode: ExecutionMode,

    /// Max jobs buffered between adjacent stages.
    ///
    /// Unset means unbounded handoff queues (no backpressure). When set, a
    /// stage blocks on send while its downstream neighbour lags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Concurrent,
            buffer_size: None,
        }
    }
}

/// Resize stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Target width in pixels
    pub width: u32,

    /// Target height in pixels
    pub height: u32,

    /// Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3
    pub filter: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            filter: "lanczos3".to_string(),
        }
    }
}

/// Resource limits applied while loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
        }
    }
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Extensions picked up when walking a directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Output naming settings.
///
/// The destination of a job is its source path with the first occurrence of
/// `input_segment` replaced by `output_segment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub input_segment: String,
    pub output_segment: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            input_segment: "images/".to_string(),
            output_segment: "images/output/".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
