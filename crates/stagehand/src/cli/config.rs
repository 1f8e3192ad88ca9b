//! The `stagehand config` command: inspect, check and scaffold the config file.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use stagehand_core::{Config, ExecutionMode};

use super::run::ModeArg;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        /// Print built-in defaults, ignoring any config file
        #[arg(long)]
        defaults: bool,
    },

    /// Print the config file path and whether it exists
    Path,

    /// Load and validate the config file, then summarize the pipeline it describes
    Check,

    /// Write a config file with defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Executor mode to record as `pipeline.mode`
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Queue bound to record as `pipeline.buffer_size`
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        buffer_size: Option<u32>,
    },
}

/// Execute the config command. `explicit` is the `--config` path, if given.
pub async fn execute(args: ConfigArgs, explicit: Option<PathBuf>) -> anyhow::Result<()> {
    let path = explicit.unwrap_or_else(Config::default_path);

    match args.command {
        ConfigCommand::Show { defaults } => {
            let config = if defaults {
                Config::default()
            } else {
                load_or_default(&path)?
            };
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            let state = if path.exists() { "" } else { " (not created)" };
            println!("{}{}", path.display(), state);
        }

        ConfigCommand::Check => {
            let config = load_or_default(&path)?;
            config.validate()?;
            println!("{}", summarize(&config));
        }

        ConfigCommand::Init {
            force,
            mode,
            buffer_size,
        } => {
            let config = scaffold(mode, buffer_size)?;
            write_new(&path, &config, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Ok(Config::load_from(path)?)
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

/// One-paragraph description of what a `run` with this config would do.
fn summarize(config: &Config) -> String {
    let queues = match config.pipeline.buffer_size {
        Some(n) => format!("bounded queues of {}", n),
        None => "unbounded queues".to_string(),
    };
    format!(
        "OK: {} mode with {}, resize to {}x{} ({}), output under '{}'",
        config.pipeline.mode,
        queues,
        config.transform.width,
        config.transform.height,
        config.transform.filter,
        config.output.output_segment
    )
}

fn scaffold(mode: Option<ModeArg>, buffer_size: Option<u32>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    match mode {
        Some(ModeArg::Concurrent) => config.pipeline.mode = ExecutionMode::Concurrent,
        Some(ModeArg::Sequential) => config.pipeline.mode = ExecutionMode::Sequential,
        Some(ModeArg::Both) => anyhow::bail!("pipeline.mode must be concurrent or sequential"),
        None => {}
    }
    config.pipeline.buffer_size = buffer_size.map(|n| n as usize);
    config.validate()?;
    Ok(config)
}

fn write_new(path: &Path, config: &Config, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    Ok(())
}
