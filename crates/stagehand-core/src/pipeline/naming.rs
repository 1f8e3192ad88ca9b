//! Destination paths for processed images.

use std::path::{Path, PathBuf};

use crate::config::OutputConfig;

/// Maps a source path to the path its processed image is written to.
#[derive(Debug, Clone)]
pub struct OutputNaming {
    input_segment: String,
    output_segment: String,
}

impl OutputNaming {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            input_segment: config.input_segment.clone(),
            output_segment: config.output_segment.clone(),
        }
    }

    /// Replace the first `input_segment` in the source with `output_segment`.
    ///
    /// Sources without the segment go to an `output/` directory beside them,
    /// so the source is never overwritten.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let source_str = source.to_string_lossy();
        if source_str.contains(&self.input_segment) {
            return PathBuf::from(source_str.replacen(
                &self.input_segment,
                &self.output_segment,
                1,
            ));
        }

        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        match source.file_name() {
            Some(name) => parent.join("output").join(name),
            None => parent.join("output"),
        }
    }

    /// Whether a path already lives under the output segment.
    pub fn is_output(&self, path: &Path) -> bool {
        path.to_string_lossy().contains(&self.output_segment)
    }
}
