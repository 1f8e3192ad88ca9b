//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::pipeline::imaging::parse_filter;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.buffer_size == Some(0) {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0 (omit it for unbounded queues)".into(),
            ));
        }
        if self.transform.width == 0 || self.transform.height == 0 {
            return Err(ConfigError::ValidationError(
                "transform.width and transform.height must be > 0".into(),
            ));
        }
        if parse_filter(&self.transform.filter).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "transform.filter '{}' is not one of nearest, triangle, catmullrom, gaussian, lanczos3",
                self.transform.filter
            )));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.output.input_segment.is_empty() || self.output.output_segment.is_empty() {
            return Err(ConfigError::ValidationError(
                "output.input_segment and output.output_segment must not be empty".into(),
            ));
        }
        if self.output.input_segment == self.output.output_segment {
            return Err(ConfigError::ValidationError(
                "output.output_segment must differ from output.input_segment".into(),
            ));
        }
        Ok(())
    }
}
