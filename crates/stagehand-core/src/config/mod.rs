//! Configuration management for Stagehand.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Stagehand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline execution settings
    pub pipeline: PipelineConfig,

    /// Resize target and filter
    pub transform: TransformConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Input discovery settings
    pub processing: ProcessingConfig,

    /// Output naming
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path (`~` is expanded).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&path_str).into_owned());
        let content = std::fs::read_to_string(expanded)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/rs.stagehand.stagehand/config.toml
    /// - Linux: ~/.config/stagehand/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\stagehand\config\config.toml
    ///
    /// Falls back to ~/.stagehand/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "stagehand", "stagehand")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".stagehand").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExecutionMode;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pipeline.mode, ExecutionMode::Concurrent);
        assert_eq!(config.pipeline.buffer_size, None);
        assert_eq!(config.transform.width, 500);
        assert_eq!(config.transform.height, 500);
        assert_eq!(config.output.input_segment, "images/");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[pipeline]"));
        assert!(toml.contains("[transform]"));
        assert!(!toml.contains("buffer_size"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [pipeline]
            mode = "sequential"
            buffer_size = 8

            [transform]
            width = 128
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.mode, ExecutionMode::Sequential);
        assert_eq!(config.pipeline.buffer_size, Some(8));
        assert_eq!(config.transform.width, 128);
        assert_eq!(config.transform.height, 500);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[pipeline\nmode = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\ninput_segment = \"src/\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output.input_segment, "src/");
        assert_eq!(config.output.output_segment, "images/output/");
    }
}
