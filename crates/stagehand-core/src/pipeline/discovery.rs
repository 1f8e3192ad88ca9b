//! Expands user inputs (files and directories) into a batch of sources.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

use super::naming::OutputNaming;

/// Discovers image files for a batch.
pub struct FileDiscovery {
    config: ProcessingConfig,
    naming: OutputNaming,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig, naming: OutputNaming) -> Self {
        Self { config, naming }
    }

    /// Build a batch from a list of inputs, preserving input order.
    ///
    /// Explicit non-directory inputs are kept as given, even if they do not
    /// exist: the pipeline reports them as load failures. Directories are
    /// walked recursively, skipping unsupported extensions and anything
    /// already under the output segment.
    pub fn discover_all(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut batch = Vec::new();
        for input in inputs {
            if input.is_dir() {
                batch.extend(self.discover_dir(input));
            } else {
                batch.push(input.clone());
            }
        }
        batch
    }

    /// Recursively find supported files under a directory, sorted by path.
    pub fn discover_dir(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && self.is_supported(p) && !self.naming.is_output(p))
            .collect();

        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}
